use sheet_store::{RowView, Sheet};

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::model::{Condition, SecurityRule, DEFAULT_ACTION};
use crate::ordering::chain_positions;
use crate::resolver::AddressResolver;
use crate::sheets::{dedup_tokens, rules, split_cell};

/// Rebuild rules in row order. Blank-name rows are skipped and do not take a
/// place in the position chain.
pub(super) fn security_rules(
    sheet: &Sheet,
    resolver: &AddressResolver,
    diags: &mut Diagnostics,
) -> Vec<SecurityRule> {
    let named = sheet
        .rows()
        .filter(|row| match row.non_blank(rules::NAME) {
            Some(_) => true,
            None => {
                diags.push(
                    &sheet.name,
                    row.line(),
                    "",
                    DiagnosticCode::MissingName,
                    "rule row has no name",
                );
                false
            }
        })
        .collect::<Vec<_>>();

    let positions = chain_positions(named.iter().map(|row| row.get(rules::NAME).trim()));

    named
        .iter()
        .zip(positions)
        .map(|(row, position)| SecurityRule {
            name: row.get(rules::NAME).trim().to_string(),
            condition: condition(row, resolver),
            position,
            action: Some(
                row.non_blank(rules::ACTION)
                    .unwrap_or(DEFAULT_ACTION)
                    .to_string(),
            ),
        })
        .collect()
}

fn condition(row: &RowView<'_>, resolver: &AddressResolver) -> Condition {
    Condition {
        source_addresses: dedup_tokens(resolver.resolve_cell(row.get(rules::SOURCE))),
        destination_addresses: dedup_tokens(resolver.resolve_cell(row.get(rules::DESTINATION))),
        services: dedup_tokens(split_cell(row.get(rules::SERVICES))),
        urls: dedup_tokens(split_cell(row.get(rules::URLS))),
        applications: dedup_tokens(split_cell(row.get(rules::APPLICATIONS))),
    }
}
