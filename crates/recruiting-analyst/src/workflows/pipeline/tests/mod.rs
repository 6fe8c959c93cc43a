mod common;
mod reducer;
