/// Extracts the `rel="next"` target from a `Link` header.
pub fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param.eq_ignore_ascii_case("rel=\"next\"") || param.eq_ignore_ascii_case("rel=next")
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    })
}
