//! Command handlers. Each module maps parsed CLI args onto `DakhlaService`
//! calls and prints the JSON envelope.

pub mod audit;
pub mod certificate;
pub mod init;
pub mod school;
pub mod session;
pub mod student;
pub mod user;

/// CLI convention for update flags: an empty string clears the column.
pub(crate) fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.is_empty() { None } else { Some(v) })
}

/// Build the pagination/sort pair from the shared list args, applying the
/// configured default and cap when no explicit limit was given.
pub(crate) fn page_and_sort(
    list: &crate::cli::ListArgs,
    general: &dakhla_config::GeneralConfig,
) -> (dakhla_db::filters::Pagination, dakhla_db::filters::SortSpec) {
    let limit = list
        .limit
        .unwrap_or(general.default_limit)
        .min(general.max_limit);
    let page = dakhla_db::filters::Pagination::new(list.page, limit);
    let sort = dakhla_db::filters::SortSpec {
        key: list.sort_by.clone(),
        order: if list.desc {
            dakhla_db::filters::SortOrder::Desc
        } else {
            dakhla_db::filters::SortOrder::Asc
        },
    };
    (page, sort)
}

#[cfg(test)]
mod tests {
    use super::clearable;

    #[test]
    fn empty_string_clears_a_field() {
        assert_eq!(clearable(None), None);
        assert_eq!(clearable(Some(String::new())), Some(None));
        assert_eq!(
            clearable(Some("Pune".to_string())),
            Some(Some("Pune".to_string()))
        );
    }
}
