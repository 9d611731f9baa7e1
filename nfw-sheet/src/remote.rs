//! Remote policy records and the provider that supplies them to export.
//!
//! The management plane returns kebab-case records (`source-address`,
//! `port-ranges`, `icmp-type`, ...). [`PolicyProvider`] abstracts "list the
//! items of a category" and "get one item"; [`SnapshotProvider`] answers both
//! from a directory of CLI dumps captured earlier.
//!
//! ## Snapshot layout
//!
//! For each category a `<stem>_output.json` file holds a JSON array of
//! `{"data": {...}}` item documents. An optional `<stem>.json` list dump
//! (`{"data": {"items": [{"name", "parent-resource-id"}]}}`) fixes the listing
//! order; without it the order of the output file is used.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ConvertError;
use crate::model::{
    AddressList, AddressListType, Application, ApplicationGroup, Category, Condition,
    PolicyBundle, PortRange, Position, Protocol, SecurityRule, Service, ServiceGroup, UrlList,
    UrlPattern,
};

/// Entry of a category listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ItemSummary {
    pub name: String,
    #[serde(default)]
    pub parent_resource_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteCondition {
    #[serde(default)]
    pub source_address: Vec<String>,
    #[serde(default)]
    pub destination_address: Vec<String>,
    #[serde(default)]
    pub service: Vec<String>,
    #[serde(default)]
    pub application: Vec<String>,
    #[serde(default)]
    pub url: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemotePosition {
    pub after_rule: Option<String>,
    pub before_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteSecurityRule {
    pub name: String,
    #[serde(default)]
    pub condition: RemoteCondition,
    pub action: Option<String>,
    #[serde(default)]
    pub position: Option<RemotePosition>,
    pub priority_order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteAddressList {
    pub name: String,
    #[serde(rename = "type")]
    pub list_type: Option<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteUrlPattern {
    pub pattern: String,
    #[serde(rename = "type")]
    pub match_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteUrlList {
    pub name: String,
    #[serde(default)]
    pub urls: Vec<RemoteUrlPattern>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemotePortRange {
    pub minimum_port: u32,
    pub maximum_port: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteService {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub port_ranges: Vec<RemotePortRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteServiceList {
    pub name: String,
    #[serde(default)]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteApplication {
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: String,
    pub icmp_type: Option<i64>,
    pub icmp_code: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteApplicationGroup {
    pub name: String,
    #[serde(default)]
    pub apps: Vec<String>,
}

/// A fetched record of any category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteObject {
    SecurityRule(RemoteSecurityRule),
    AddressList(RemoteAddressList),
    UrlList(RemoteUrlList),
    Service(RemoteService),
    ServiceGroup(RemoteServiceList),
    Application(RemoteApplication),
    ApplicationGroup(RemoteApplicationGroup),
}

/// Source of remote policy records.
pub trait PolicyProvider {
    fn list_items(&self, category: Category) -> Result<Vec<ItemSummary>, ConvertError>;

    fn get_item(
        &self,
        category: Category,
        parent_resource_id: &str,
        name: &str,
    ) -> Result<RemoteObject, ConvertError>;
}

/// A record that exists remotely but has no sheet representation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedRecord {
    pub category: Category,
    pub name: String,
    pub reason: String,
}

/// Result of walking a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPolicy {
    pub bundle: PolicyBundle,
    pub skipped: Vec<SkippedRecord>,
}

/// File stem of a category's CLI dump.
pub fn snapshot_stem(category: Category) -> &'static str {
    match category {
        Category::SecurityRule => "security_rule",
        Category::AddressList => "addresslist",
        Category::UrlList => "url_list",
        Category::Service => "service",
        Category::ServiceGroup => "servicelist",
        Category::Application => "application",
        Category::ApplicationGroup => "applicationlist",
    }
}

fn is_required(category: Category) -> bool {
    matches!(
        category,
        Category::SecurityRule | Category::AddressList | Category::Service
    )
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    data: ListData,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(default)]
    items: Vec<ItemSummary>,
}

#[derive(Debug, Default)]
struct CategorySnapshot {
    listing: Vec<ItemSummary>,
    items: BTreeMap<String, Value>,
}

/// Provider backed by a directory of previously captured CLI dumps.
#[derive(Debug)]
pub struct SnapshotProvider {
    root: PathBuf,
    categories: BTreeMap<Category, CategorySnapshot>,
}

impl SnapshotProvider {
    /// Load every category dump under `dir`.
    ///
    /// Rules, address lists and services must be present; the remaining
    /// categories are treated as empty when their files are absent.
    pub fn open(dir: &Path) -> Result<Self, ConvertError> {
        let mut categories = BTreeMap::new();
        for category in Category::ALL {
            let snapshot = load_category(dir, category)?;
            debug!(
                %category,
                items = snapshot.listing.len(),
                "snapshot category loaded"
            );
            categories.insert(category, snapshot);
        }
        Ok(Self {
            root: dir.to_path_buf(),
            categories,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn load_category(dir: &Path, category: Category) -> Result<CategorySnapshot, ConvertError> {
    let stem = snapshot_stem(category);
    let output_path = dir.join(format!("{stem}_output.json"));
    let list_path = dir.join(format!("{stem}.json"));

    if !output_path.exists() {
        if is_required(category) {
            return Err(ConvertError::MissingSnapshot {
                category,
                path: output_path.display().to_string(),
            });
        }
        warn!(%category, path = %output_path.display(), "snapshot file absent; category treated as empty");
        return Ok(CategorySnapshot::default());
    }

    let documents: Vec<Value> = read_json(&output_path)?;
    let mut items = BTreeMap::new();
    let mut derived_listing = Vec::new();
    for document in documents {
        let data = document.get("data").cloned().unwrap_or(document);
        let Some(name) = data.get("name").and_then(Value::as_str).map(ToOwned::to_owned) else {
            warn!(%category, "snapshot item without a name skipped");
            continue;
        };
        let parent_resource_id = data
            .get("parent-resource-id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        derived_listing.push(ItemSummary {
            name: name.clone(),
            parent_resource_id,
        });
        items.insert(name, data);
    }

    let listing = if list_path.exists() {
        let envelope: ListEnvelope = read_json(&list_path)?;
        envelope.data.items
    } else {
        derived_listing
    };

    Ok(CategorySnapshot { listing, items })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConvertError> {
    let raw = fs::read_to_string(path).map_err(|source| ConvertError::SnapshotIo {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConvertError::SnapshotParse {
        path: path.display().to_string(),
        source,
    })
}

impl PolicyProvider for SnapshotProvider {
    fn list_items(&self, category: Category) -> Result<Vec<ItemSummary>, ConvertError> {
        Ok(self
            .categories
            .get(&category)
            .map(|c| c.listing.clone())
            .unwrap_or_default())
    }

    fn get_item(
        &self,
        category: Category,
        _parent_resource_id: &str,
        name: &str,
    ) -> Result<RemoteObject, ConvertError> {
        let value = self
            .categories
            .get(&category)
            .and_then(|c| c.items.get(name))
            .ok_or_else(|| ConvertError::MissingItem {
                category,
                name: name.to_string(),
            })?;
        decode_object(category, name, value.clone())
    }
}

/// Decode a raw item document into the typed record for `category`.
pub fn decode_object(
    category: Category,
    name: &str,
    value: Value,
) -> Result<RemoteObject, ConvertError> {
    fn typed<T: DeserializeOwned>(
        category: Category,
        name: &str,
        value: Value,
    ) -> Result<T, ConvertError> {
        serde_json::from_value(value).map_err(|source| ConvertError::Decode {
            category,
            name: name.to_string(),
            source,
        })
    }

    Ok(match category {
        Category::SecurityRule => RemoteObject::SecurityRule(typed(category, name, value)?),
        Category::AddressList => RemoteObject::AddressList(typed(category, name, value)?),
        Category::UrlList => RemoteObject::UrlList(typed(category, name, value)?),
        Category::Service => RemoteObject::Service(typed(category, name, value)?),
        Category::ServiceGroup => RemoteObject::ServiceGroup(typed(category, name, value)?),
        Category::Application => RemoteObject::Application(typed(category, name, value)?),
        Category::ApplicationGroup => {
            RemoteObject::ApplicationGroup(typed(category, name, value)?)
        }
    })
}

/// Walk every category of `provider` in listing order and build a bundle.
///
/// Records that the sheet layout cannot express (non-ICMP applications,
/// services of other types, out-of-range ports) are skipped and reported.
pub fn fetch_bundle<P: PolicyProvider + ?Sized>(
    provider: &P,
) -> Result<FetchedPolicy, ConvertError> {
    let mut fetched = FetchedPolicy::default();
    for category in Category::ALL {
        let listing = provider.list_items(category)?;
        for item in &listing {
            let object = provider.get_item(category, &item.parent_resource_id, &item.name)?;
            if let Err(reason) = absorb(&mut fetched.bundle, object) {
                warn!(%category, name = %item.name, %reason, "record skipped");
                fetched.skipped.push(SkippedRecord {
                    category,
                    name: item.name.clone(),
                    reason,
                });
            }
        }
        debug!(
            %category,
            fetched = fetched.bundle.count(category),
            "category fetched"
        );
    }
    Ok(fetched)
}

fn absorb(bundle: &mut PolicyBundle, object: RemoteObject) -> Result<(), String> {
    match object {
        RemoteObject::SecurityRule(r) => bundle.rules.push(rule_from_remote(r)),
        RemoteObject::AddressList(l) => bundle.address_lists.push(address_list_from_remote(l)?),
        RemoteObject::UrlList(l) => bundle.url_lists.push(UrlList {
            name: l.name,
            urls: l
                .urls
                .into_iter()
                .map(|u| UrlPattern::simple(u.pattern))
                .collect(),
        }),
        RemoteObject::Service(s) => bundle.services.push(service_from_remote(s)?),
        RemoteObject::ServiceGroup(g) => bundle.service_groups.push(ServiceGroup {
            name: g.name,
            services: g.services,
        }),
        RemoteObject::Application(a) => bundle.applications.push(application_from_remote(a)?),
        RemoteObject::ApplicationGroup(g) => bundle.application_groups.push(ApplicationGroup {
            name: g.name,
            apps: g.apps,
        }),
    }
    Ok(())
}

fn rule_from_remote(rule: RemoteSecurityRule) -> SecurityRule {
    let position = match rule.position.and_then(|p| p.after_rule) {
        Some(after) => Position::after(after),
        None => Position::first(),
    };
    SecurityRule {
        name: rule.name,
        condition: Condition {
            source_addresses: rule.condition.source_address,
            destination_addresses: rule.condition.destination_address,
            services: rule.condition.service,
            urls: rule.condition.url,
            applications: rule.condition.application,
        },
        position,
        action: rule.action,
    }
}

fn address_list_from_remote(list: RemoteAddressList) -> Result<AddressList, String> {
    match list.list_type.as_deref() {
        None | Some("IP") => Ok(AddressList {
            name: list.name,
            list_type: AddressListType::Ip,
            addresses: list.addresses,
        }),
        Some(other) => Err(format!("address list type {other} is not supported")),
    }
}

fn service_from_remote(service: RemoteService) -> Result<Service, String> {
    let protocol = match service.service_type.as_str() {
        "TCP_SERVICE" => Protocol::Tcp,
        "UDP_SERVICE" => Protocol::Udp,
        other => return Err(format!("service type {other} is not supported")),
    };
    let port_ranges = service
        .port_ranges
        .iter()
        .map(|r| {
            PortRange::new(r.minimum_port, r.maximum_port.unwrap_or(r.minimum_port))
                .map_err(|e| e.to_string())
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Service {
        name: service.name,
        protocol,
        port_ranges,
    })
}

fn application_from_remote(app: RemoteApplication) -> Result<Application, String> {
    if app.app_type != "ICMP" {
        return Err(format!("application type {} is not supported", app.app_type));
    }
    let icmp_type = app
        .icmp_type
        .ok_or_else(|| "ICMP application without icmp-type".to_string())?;
    let icmp_type =
        u8::try_from(icmp_type).map_err(|_| format!("icmp-type {icmp_type} is outside 0-255"))?;
    if app.icmp_code.is_some() {
        debug!(name = %app.name, "icmp-code dropped; not represented on the service sheet");
    }
    Ok(Application::icmp(app.name, icmp_type))
}
