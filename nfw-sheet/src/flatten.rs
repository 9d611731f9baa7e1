//! Export direction: policy objects to editable sheets.
//!
//! - one rule row per rule, condition lists joined into cells, provider order
//! - one address-list row per list
//! - one url-list row per (name, pattern) pair, or a blank-pattern row for
//!   a list with no patterns
//! - one unified service sheet with a `type` column: services, service
//!   groups, ICMP applications, application groups
//!
//! Only groups with more than one member get a row. Missing optional fields
//! become empty cells; nothing is defaulted here.

use sheet_store::{Sheet, Workbook};
use tracing::debug;

use crate::config::{Config, SheetNames};
use crate::model::{is_emittable, PolicyBundle, ServiceEntry};
use crate::sheets::{self, join_cell};

/// Flattens a [`PolicyBundle`] into the four-sheet workbook layout.
#[derive(Debug, Clone)]
pub struct FlatteningEngine<'a> {
    names: &'a SheetNames,
    join: &'a str,
}

impl<'a> FlatteningEngine<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            names: &config.sheets,
            join: &config.format.join,
        }
    }

    pub fn flatten(&self, bundle: &PolicyBundle) -> Workbook {
        let mut book = Workbook::new();
        book.insert(self.rules_sheet(bundle));
        book.insert(self.address_sheet(bundle));
        book.insert(self.url_sheet(bundle));
        book.insert(self.service_sheet(bundle));
        for sheet in &book.sheets {
            debug!(sheet = %sheet.name, rows = sheet.len(), "sheet flattened");
        }
        book
    }

    fn rules_sheet(&self, bundle: &PolicyBundle) -> Sheet {
        let mut sheet = Sheet::new(&self.names.rules, sheets::rules::COLUMNS);
        for rule in &bundle.rules {
            let c = &rule.condition;
            sheet.push_row([
                rule.name.clone(),
                join_cell(&c.source_addresses, self.join),
                join_cell(&c.destination_addresses, self.join),
                join_cell(&c.services, self.join),
                join_cell(&c.applications, self.join),
                join_cell(&c.urls, self.join),
                rule.action.clone().unwrap_or_default(),
            ]);
        }
        sheet
    }

    fn address_sheet(&self, bundle: &PolicyBundle) -> Sheet {
        let mut sheet = Sheet::new(&self.names.address_lists, sheets::address_lists::COLUMNS);
        for list in &bundle.address_lists {
            sheet.push_row([list.name.clone(), join_cell(&list.addresses, self.join)]);
        }
        sheet
    }

    fn url_sheet(&self, bundle: &PolicyBundle) -> Sheet {
        let mut sheet = Sheet::new(&self.names.url_lists, sheets::url_lists::COLUMNS);
        for list in &bundle.url_lists {
            if list.urls.is_empty() {
                sheet.push_row([list.name.as_str(), ""]);
            }
            for url in &list.urls {
                sheet.push_row([list.name.as_str(), url.pattern.as_str()]);
            }
        }
        sheet
    }

    fn service_sheet(&self, bundle: &PolicyBundle) -> Sheet {
        let mut sheet = Sheet::new(&self.names.services, sheets::services::COLUMNS);
        for entry in service_entries(bundle) {
            sheet.push_row(self.service_row(&entry));
        }
        sheet
    }

    fn service_row(&self, entry: &ServiceEntry) -> [String; 6] {
        let name = entry.name().to_string();
        let kind = entry.kind().as_str().to_string();
        match entry {
            ServiceEntry::Service(svc) => {
                let mins = svc
                    .port_ranges
                    .iter()
                    .map(|r| r.minimum_port.to_string())
                    .collect::<Vec<_>>();
                let maxs = svc
                    .port_ranges
                    .iter()
                    .map(|r| r.maximum_port.to_string())
                    .collect::<Vec<_>>();
                [
                    name,
                    kind,
                    join_cell(&mins, self.join),
                    join_cell(&maxs, self.join),
                    String::new(),
                    String::new(),
                ]
            }
            ServiceEntry::ServiceGroup(group) => [
                name,
                kind,
                String::new(),
                String::new(),
                String::new(),
                join_cell(&group.services, self.join),
            ],
            ServiceEntry::Application(app) => [
                name,
                kind,
                String::new(),
                String::new(),
                app.icmp_type.to_string(),
                String::new(),
            ],
            ServiceEntry::ApplicationGroup(group) => [
                name,
                kind,
                String::new(),
                String::new(),
                String::new(),
                join_cell(&group.apps, self.join),
            ],
        }
    }
}

/// Service-sheet entries in sheet order: services, emittable service groups,
/// applications, emittable application groups.
pub fn service_entries(bundle: &PolicyBundle) -> Vec<ServiceEntry> {
    let services = bundle.services.iter().cloned().map(ServiceEntry::Service);
    let service_groups = bundle
        .service_groups
        .iter()
        .filter(|g| is_emittable(*g))
        .cloned()
        .map(ServiceEntry::ServiceGroup);
    let applications = bundle
        .applications
        .iter()
        .cloned()
        .map(ServiceEntry::Application);
    let application_groups = bundle
        .application_groups
        .iter()
        .filter(|g| is_emittable(*g))
        .cloned()
        .map(ServiceEntry::ApplicationGroup);

    services
        .chain(service_groups)
        .chain(applications)
        .chain(application_groups)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::FlatteningEngine;
    use crate::config::Config;
    use crate::model::Category;
    use crate::remote::fetch_bundle;
    use crate::remote::tests::MemoryProvider;

    fn flatten(provider: MemoryProvider) -> sheet_store::Workbook {
        let config = Config::default();
        let fetched = fetch_bundle(&provider).expect("fetch");
        FlatteningEngine::new(&config).flatten(&fetched.bundle)
    }

    fn cells(book: &sheet_store::Workbook, sheet: &str) -> Vec<Vec<String>> {
        book.sheet(sheet)
            .expect("sheet present")
            .rows
            .iter()
            .map(|r| r.cells.clone())
            .collect()
    }

    #[test]
    fn rules_keep_source_order_and_join_conditions() {
        let book = flatten(
            MemoryProvider::default()
                .with(
                    Category::SecurityRule,
                    json!({
                        "name": "web",
                        "action": "ALLOW",
                        "condition": {
                            "source-address": ["office", "lab"],
                            "destination-address": ["dmz"],
                            "service": ["https"],
                            "application": ["ping"],
                            "url": ["allowed"]
                        }
                    }),
                )
                .with(Category::SecurityRule, json!({"name": "rest", "condition": {}})),
        );

        assert_eq!(
            cells(&book, "security-rules"),
            vec![
                vec!["web", "office, lab", "dmz", "https", "ping", "allowed", "ALLOW"],
                vec!["rest", "", "", "", "", "", ""],
            ]
        );
    }

    #[test]
    fn url_lists_get_one_row_per_pattern() {
        let book = flatten(MemoryProvider::default().with(
            Category::UrlList,
            json!({"name": "blocked", "urls": [
                {"pattern": "*.ads.test", "type": "SIMPLE"},
                {"pattern": "tracker.test", "type": "SIMPLE"}
            ]}),
        ));

        assert_eq!(
            cells(&book, "url_lists"),
            vec![
                vec!["blocked", "*.ads.test"],
                vec!["blocked", "tracker.test"],
            ]
        );
    }

    #[test]
    fn url_list_without_patterns_keeps_a_blank_row() {
        let book = flatten(
            MemoryProvider::default()
                .with(Category::UrlList, json!({"name": "pending", "urls": []}))
                .with(Category::UrlList, json!({"name": "unset"})),
        );

        assert_eq!(
            cells(&book, "url_lists"),
            vec![vec!["pending", ""], vec!["unset", ""]]
        );
    }

    #[test]
    fn single_member_groups_are_not_exported() {
        let book = flatten(
            MemoryProvider::default()
                .with(
                    Category::Service,
                    json!({"name": "web", "type": "TCP_SERVICE", "port-ranges": [
                        {"minimum-port": 80, "maximum-port": 80},
                        {"minimum-port": 8000, "maximum-port": 8080}
                    ]}),
                )
                .with(Category::ServiceGroup, json!({"name": "web", "services": ["web"]}))
                .with(
                    Category::ServiceGroup,
                    json!({"name": "web-dns", "services": ["web", "dns"]}),
                )
                .with(
                    Category::Application,
                    json!({"name": "ping", "type": "ICMP", "icmp-type": 8, "icmp-code": null}),
                )
                .with(Category::ApplicationGroup, json!({"name": "ping", "apps": ["ping"]}))
                .with(
                    Category::ApplicationGroup,
                    json!({"name": "icmp-all", "apps": ["ping", "unreach"]}),
                ),
        );

        assert_eq!(
            cells(&book, "service"),
            vec![
                vec!["web", "TCP_SERVICE", "80, 8000", "80, 8080", "", ""],
                vec!["web-dns", "SERVICE_GROUP", "", "", "", "web, dns"],
                vec!["ping", "ICMP_TYPE", "", "", "8", ""],
                vec!["icmp-all", "ICMP_GROUP", "", "", "", "ping, unreach"],
            ]
        );
    }

    #[test]
    fn address_lists_join_into_one_cell() {
        let book = flatten(MemoryProvider::default().with(
            Category::AddressList,
            json!({"name": "office", "type": "IP", "addresses": ["10.0.0.1", "10.0.0.0/24"]}),
        ));
        assert_eq!(
            cells(&book, "iplist"),
            vec![vec!["office", "10.0.0.1, 10.0.0.0/24"]]
        );
    }

    #[test]
    fn every_sheet_is_written_even_when_empty() {
        let book = flatten(MemoryProvider::default());
        assert_eq!(
            book.sheet_names(),
            vec!["security-rules", "iplist", "url_lists", "service"]
        );
        assert_eq!(
            book.sheet("service").expect("service").headers,
            vec!["name", "type", "minimumPort", "maximumPort", "icmpType", "services"]
        );
    }
}
