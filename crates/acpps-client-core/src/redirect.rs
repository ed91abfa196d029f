/// The navigation target carried by a redirect button's `data-url`.
#[must_use]
pub fn redirect_target(data_url: Option<&str>) -> Option<&str> {
    data_url.filter(|url| !url.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_configured_url_through_untouched() {
        assert_eq!(
            redirect_target(Some("/users/profile/update/")),
            Some("/users/profile/update/")
        );
    }

    #[test]
    fn blank_or_missing_url_is_ignored() {
        assert_eq!(redirect_target(Some("  ")), None);
        assert_eq!(redirect_target(None), None);
    }
}
