//! Policy object model shared by the export and import pipelines.
//!
//! Every category carries a `name` that is unique within that category only;
//! a service and an application group may share a name. Serialization uses the
//! camelCase document shape accepted by the management plane.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Action applied when a rule row leaves the action cell blank.
pub const DEFAULT_ACTION: &str = "ALLOW";

/// One kind of policy object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    SecurityRule,
    AddressList,
    UrlList,
    Service,
    ServiceGroup,
    Application,
    ApplicationGroup,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::SecurityRule,
        Category::AddressList,
        Category::UrlList,
        Category::Service,
        Category::ServiceGroup,
        Category::Application,
        Category::ApplicationGroup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::SecurityRule => "security-rule",
            Category::AddressList => "address-list",
            Category::UrlList => "url-list",
            Category::Service => "service",
            Category::ServiceGroup => "service-list",
            Category::Application => "application",
            Category::ApplicationGroup => "application-group",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered firewall rule. Order is carried by `position`, never by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRule {
    pub name: String,
    pub condition: Condition,
    pub position: Position,
    /// `None` only when the upstream record had no action; reconstruction
    /// always fills it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Match condition of a rule. All references are soft: they are carried
/// verbatim whether or not the named object exists in the same batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "sourceAddress", default)]
    pub source_addresses: Vec<String>,
    #[serde(rename = "destinationAddress", default)]
    pub destination_addresses: Vec<String>,
    #[serde(rename = "service", default)]
    pub services: Vec<String>,
    #[serde(rename = "url", default)]
    pub urls: Vec<String>,
    #[serde(rename = "application", default)]
    pub applications: Vec<String>,
}

/// Relative insertion point. An empty position means "first rule".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_rule: Option<String>,
}

impl Position {
    pub fn first() -> Self {
        Self::default()
    }

    pub fn after(name: impl Into<String>) -> Self {
        Self {
            after_rule: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressListType {
    #[default]
    #[serde(rename = "IP")]
    Ip,
}

/// Named set of address literals (hosts, CIDRs, ranges).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressList {
    pub name: String,
    #[serde(rename = "type", default)]
    pub list_type: AddressListType,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlMatchType {
    #[default]
    #[serde(rename = "SIMPLE")]
    Simple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlPattern {
    pub pattern: String,
    #[serde(rename = "type", default)]
    pub match_type: UrlMatchType,
}

impl UrlPattern {
    pub fn simple(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            match_type: UrlMatchType::Simple,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlList {
    pub name: String,
    pub urls: Vec<UrlPattern>,
}

/// Transport protocol of a port service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "TCP_SERVICE")]
    Tcp,
    #[serde(rename = "UDP_SERVICE")]
    Udp,
}

impl Protocol {
    pub fn kind(self) -> ServiceKind {
        match self {
            Protocol::Tcp => ServiceKind::TcpService,
            Protocol::Udp => ServiceKind::UdpService,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortRangeError {
    #[error("port {0} is outside 1-65535")]
    OutOfRange(u32),
    #[error("minimum port {min} is greater than maximum port {max}")]
    Inverted { min: u32, max: u32 },
}

/// Inclusive port range with `1 <= minimum_port <= maximum_port <= 65535`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRange {
    pub minimum_port: u16,
    pub maximum_port: u16,
}

impl PortRange {
    pub fn new(min: u32, max: u32) -> Result<Self, PortRangeError> {
        for port in [min, max] {
            if !(1..=65535).contains(&port) {
                return Err(PortRangeError::OutOfRange(port));
            }
        }
        if min > max {
            return Err(PortRangeError::Inverted { min, max });
        }
        Ok(Self {
            minimum_port: min as u16,
            maximum_port: max as u16,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    #[serde(rename = "type")]
    pub protocol: Protocol,
    pub port_ranges: Vec<PortRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub name: String,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationType {
    #[default]
    #[serde(rename = "ICMP")]
    Icmp,
}

/// ICMP application. `icmp_code` is always absent in this model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub name: String,
    #[serde(rename = "type", default)]
    pub app_type: ApplicationType,
    pub icmp_type: u8,
    pub icmp_code: Option<u8>,
}

impl Application {
    pub fn icmp(name: impl Into<String>, icmp_type: u8) -> Self {
        Self {
            name: name.into(),
            app_type: ApplicationType::Icmp,
            icmp_type,
            icmp_code: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationGroup {
    pub name: String,
    pub apps: Vec<String>,
}

/// A named collection of member names.
pub trait MemberGroup {
    fn group_name(&self) -> &str;
    fn members(&self) -> &[String];
}

impl MemberGroup for ServiceGroup {
    fn group_name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> &[String] {
        &self.services
    }
}

impl MemberGroup for ApplicationGroup {
    fn group_name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> &[String] {
        &self.apps
    }
}

/// Whether a group is worth a row or a document of its own.
///
/// Single-member groups are dropped on export and implicit singleton groups
/// are not emitted on import. Both directions go through this predicate.
pub fn is_emittable<G: MemberGroup + ?Sized>(group: &G) -> bool {
    group.members().len() > 1
}

/// Value of the `type` column on the service sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    TcpService,
    UdpService,
    ServiceGroup,
    IcmpType,
    IcmpGroup,
}

impl ServiceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::TcpService => "TCP_SERVICE",
            ServiceKind::UdpService => "UDP_SERVICE",
            ServiceKind::ServiceGroup => "SERVICE_GROUP",
            ServiceKind::IcmpType => "ICMP_TYPE",
            ServiceKind::IcmpGroup => "ICMP_GROUP",
        }
    }

    pub fn protocol(self) -> Option<Protocol> {
        match self {
            ServiceKind::TcpService => Some(Protocol::Tcp),
            ServiceKind::UdpService => Some(Protocol::Udp),
            _ => None,
        }
    }
}

impl Display for ServiceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown service type '{0}'")]
pub struct UnknownServiceKind(pub String);

impl FromStr for ServiceKind {
    type Err = UnknownServiceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TCP_SERVICE" => Ok(ServiceKind::TcpService),
            "UDP_SERVICE" => Ok(ServiceKind::UdpService),
            "SERVICE_GROUP" => Ok(ServiceKind::ServiceGroup),
            "ICMP_TYPE" => Ok(ServiceKind::IcmpType),
            "ICMP_GROUP" => Ok(ServiceKind::IcmpGroup),
            _ => Err(UnknownServiceKind(s.trim().to_string())),
        }
    }
}

/// One row of the unified service sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEntry {
    Service(Service),
    ServiceGroup(ServiceGroup),
    Application(Application),
    ApplicationGroup(ApplicationGroup),
}

impl ServiceEntry {
    pub fn name(&self) -> &str {
        match self {
            ServiceEntry::Service(s) => &s.name,
            ServiceEntry::ServiceGroup(g) => &g.name,
            ServiceEntry::Application(a) => &a.name,
            ServiceEntry::ApplicationGroup(g) => &g.name,
        }
    }

    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceEntry::Service(s) => s.protocol.kind(),
            ServiceEntry::ServiceGroup(_) => ServiceKind::ServiceGroup,
            ServiceEntry::Application(_) => ServiceKind::IcmpType,
            ServiceEntry::ApplicationGroup(_) => ServiceKind::IcmpGroup,
        }
    }
}

/// Complete policy: one ordered collection per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyBundle {
    pub rules: Vec<SecurityRule>,
    pub address_lists: Vec<AddressList>,
    pub url_lists: Vec<UrlList>,
    pub services: Vec<Service>,
    pub service_groups: Vec<ServiceGroup>,
    pub applications: Vec<Application>,
    pub application_groups: Vec<ApplicationGroup>,
}

impl PolicyBundle {
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::SecurityRule => self.rules.len(),
            Category::AddressList => self.address_lists.len(),
            Category::UrlList => self.url_lists.len(),
            Category::Service => self.services.len(),
            Category::ServiceGroup => self.service_groups.len(),
            Category::Application => self.applications.len(),
            Category::ApplicationGroup => self.application_groups.len(),
        }
    }

    /// Names that occur more than once within a single category. Rules are
    /// excluded; duplicate rule names are carried through as-is.
    pub fn duplicate_names(&self) -> Vec<(Category, String)> {
        let mut out = Vec::new();
        let mut check = |category: Category, names: Vec<&str>| {
            let mut seen = std::collections::BTreeSet::new();
            for name in names {
                if !seen.insert(name) {
                    out.push((category, name.to_string()));
                }
            }
        };
        check(
            Category::AddressList,
            self.address_lists.iter().map(|l| l.name.as_str()).collect(),
        );
        check(
            Category::UrlList,
            self.url_lists.iter().map(|l| l.name.as_str()).collect(),
        );
        check(
            Category::Service,
            self.services.iter().map(|s| s.name.as_str()).collect(),
        );
        check(
            Category::ServiceGroup,
            self.service_groups.iter().map(|g| g.name.as_str()).collect(),
        );
        check(
            Category::Application,
            self.applications.iter().map(|a| a.name.as_str()).collect(),
        );
        check(
            Category::ApplicationGroup,
            self.application_groups
                .iter()
                .map(|g| g.name.as_str())
                .collect(),
        );
        out
    }
}
