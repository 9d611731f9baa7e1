use std::collections::{HashMap, HashSet};

use sheet_store::Sheet;

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::model::{AddressList, AddressListType, UrlList, UrlPattern};
use crate::sheets::{address_lists, dedup_tokens, split_cell, url_lists};

/// Group `(name, value)` pairs by name, keeping names in first-seen order and
/// values in input order within each name. Adjacency is not required.
pub fn group_by_name<I, V>(pairs: I) -> Vec<(String, Vec<V>)>
where
    I: IntoIterator<Item = (String, V)>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<V>)> = Vec::new();
    for (name, value) in pairs {
        match index.get(&name) {
            Some(&at) => groups[at].1.push(value),
            None => {
                index.insert(name.clone(), groups.len());
                groups.push((name, vec![value]));
            }
        }
    }
    groups
}

/// One address list per row. A repeated name keeps the first row.
pub(super) fn address_lists(sheet: &Sheet, diags: &mut Diagnostics) -> Vec<AddressList> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in sheet.rows() {
        let Some(name) = row.non_blank(address_lists::NAME) else {
            diags.push(
                &sheet.name,
                row.line(),
                "",
                DiagnosticCode::MissingName,
                "address list row has no name",
            );
            continue;
        };
        if !seen.insert(name) {
            diags.push(
                &sheet.name,
                row.line(),
                name,
                DiagnosticCode::DuplicateName,
                "address list already defined on an earlier row; row ignored",
            );
            continue;
        }
        out.push(AddressList {
            name: name.to_string(),
            list_type: AddressListType::Ip,
            addresses: dedup_tokens(split_cell(row.get(address_lists::ADDRESSES))),
        });
    }
    out
}

/// Fold pattern rows into one list per name. Blank patterns are dropped.
pub(super) fn url_lists(sheet: &Sheet, diags: &mut Diagnostics) -> Vec<UrlList> {
    let mut pairs = Vec::new();
    for row in sheet.rows() {
        let Some(name) = row.non_blank(url_lists::NAME) else {
            diags.push(
                &sheet.name,
                row.line(),
                "",
                DiagnosticCode::MissingName,
                "url list row has no name",
            );
            continue;
        };
        pairs.push((name.to_string(), row.non_blank(url_lists::PATTERN)));
    }

    group_by_name(pairs)
        .into_iter()
        .map(|(name, patterns)| UrlList {
            name,
            urls: patterns
                .into_iter()
                .flatten()
                .map(UrlPattern::simple)
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sheet_store::Sheet;

    use super::{address_lists, group_by_name, url_lists};
    use crate::diagnostics::{DiagnosticCode, Diagnostics};
    use crate::model::UrlPattern;
    use crate::sheets;

    #[test]
    fn grouping_does_not_depend_on_adjacency() {
        let grouped = group_by_name([
            ("b".to_string(), 1),
            ("a".to_string(), 2),
            ("b".to_string(), 3),
        ]);
        assert_eq!(
            grouped,
            vec![("b".to_string(), vec![1, 3]), ("a".to_string(), vec![2])]
        );
    }

    #[test]
    fn url_rows_fold_into_lists_in_first_seen_order() {
        let mut sheet = Sheet::new("url_lists", sheets::url_lists::COLUMNS);
        sheet.push_row(["blocked", "*.ads.test"]);
        sheet.push_row(["allowed", "intranet.test"]);
        sheet.push_row(["blocked", "tracker.test"]);
        sheet.push_row(["blocked", "  "]);

        let mut diags = Diagnostics::new();
        let lists = url_lists(&sheet, &mut diags);

        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name, "blocked");
        assert_eq!(
            lists[0].urls,
            vec![
                UrlPattern::simple("*.ads.test"),
                UrlPattern::simple("tracker.test")
            ]
        );
        assert_eq!(lists[1].name, "allowed");
        assert!(diags.into_vec().is_empty());
    }

    #[test]
    fn url_list_with_only_blank_patterns_is_kept_empty() {
        let mut sheet = Sheet::new("url_lists", sheets::url_lists::COLUMNS);
        sheet.push_row(["placeholder", ""]);

        let mut diags = Diagnostics::new();
        let lists = url_lists(&sheet, &mut diags);
        assert_eq!(lists.len(), 1);
        assert!(lists[0].urls.is_empty());
    }

    #[test]
    fn address_cells_split_into_unique_literals() {
        let mut sheet = Sheet::new("iplist", sheets::address_lists::COLUMNS);
        sheet.push_row(["office", " 10.0.0.1 ,10.0.0.2,, 10.0.0.1"]);
        sheet.push_row(["empty", ""]);

        let mut diags = Diagnostics::new();
        let lists = address_lists(&sheet, &mut diags);

        assert_eq!(lists[0].addresses, vec!["10.0.0.1", "10.0.0.2"]);
        assert!(lists[1].addresses.is_empty());
    }

    #[test]
    fn repeated_and_blank_names_are_diagnosed() {
        let mut sheet = Sheet::new("iplist", sheets::address_lists::COLUMNS);
        sheet.push_row(["office", "10.0.0.1"]);
        sheet.push_row(["", "10.0.0.9"]);
        sheet.push_row(["office", "10.0.0.2"]);

        let mut diags = Diagnostics::new();
        let lists = address_lists(&sheet, &mut diags);

        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].addresses, vec!["10.0.0.1"]);
        let codes = diags
            .into_vec()
            .into_iter()
            .map(|d| (d.line, d.code))
            .collect::<Vec<_>>();
        assert_eq!(
            codes,
            vec![
                (3, DiagnosticCode::MissingName),
                (4, DiagnosticCode::DuplicateName)
            ]
        );
    }
}
