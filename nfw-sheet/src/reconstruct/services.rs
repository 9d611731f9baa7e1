use std::collections::HashSet;

use sheet_store::{RowView, Sheet};

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::model::{
    is_emittable, Application, ApplicationGroup, PortRange, PortRangeError, Protocol, Service,
    ServiceGroup, ServiceKind,
};
use crate::sheets::{dedup_tokens, services, split_cell};

/// Objects decoded from the unified service sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct ServiceObjects {
    pub services: Vec<Service>,
    pub service_groups: Vec<ServiceGroup>,
    pub applications: Vec<Application>,
    pub application_groups: Vec<ApplicationGroup>,
}

/// Parse a port or ICMP number cell token. Spreadsheet tools often store
/// whole numbers as `80.0`, which is accepted; any real fraction is not.
pub fn parse_port(token: &str) -> Option<u32> {
    let token = token.trim();
    if let Ok(value) = token.parse::<u32>() {
        return Some(value);
    }
    let value = token.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}

struct Decoder<'a> {
    sheet: &'a Sheet,
    diags: &'a mut Diagnostics,
    /// Names of TCP and UDP services whose rows decode cleanly.
    port_services: HashSet<&'a str>,
    seen: HashSet<(ServiceKind, &'a str)>,
    out: ServiceObjects,
}

pub(super) fn service_objects(sheet: &Sheet, diags: &mut Diagnostics) -> ServiceObjects {
    let mut decoder = Decoder {
        sheet,
        diags,
        port_services: decodable_port_services(sheet),
        seen: HashSet::new(),
        out: ServiceObjects::default(),
    };
    for row in sheet.rows() {
        decoder.row(row);
    }
    decoder.out
}

// Only the first row of each (kind, name) counts; later ones are duplicates.
fn decodable_port_services(sheet: &Sheet) -> HashSet<&str> {
    let mut first_rows = HashSet::new();
    sheet
        .rows()
        .filter_map(|row| {
            let name = row.non_blank(services::NAME)?;
            let kind = row.get(services::TYPE).parse::<ServiceKind>().ok()?;
            kind.protocol()?;
            (first_rows.insert((kind, name)) && port_ranges(&row).is_ok()).then_some(name)
        })
        .collect()
}

fn port_ranges(row: &RowView<'_>) -> Result<Vec<PortRange>, (DiagnosticCode, String)> {
    let mins = split_cell(row.get(services::MIN_PORT));
    let maxs = split_cell(row.get(services::MAX_PORT));
    if mins.len() != maxs.len() {
        return Err((
            DiagnosticCode::PortCountMismatch,
            format!(
                "{} minimum ports but {} maximum ports",
                mins.len(),
                maxs.len()
            ),
        ));
    }
    if mins.is_empty() {
        return Err((
            DiagnosticCode::InvalidPort,
            "service has no port ranges; row ignored".to_string(),
        ));
    }

    mins.iter()
        .zip(&maxs)
        .map(|(min, max)| {
            let (Some(lo), Some(hi)) = (parse_port(min), parse_port(max)) else {
                return Err((
                    DiagnosticCode::InvalidPort,
                    format!("port range '{min}'-'{max}' is not numeric"),
                ));
            };
            PortRange::new(lo, hi).map_err(|err| match err {
                PortRangeError::OutOfRange(_) => (DiagnosticCode::PortOutOfRange, err.to_string()),
                PortRangeError::Inverted { .. } => (DiagnosticCode::InvalidPort, err.to_string()),
            })
        })
        .collect()
}

impl<'a> Decoder<'a> {
    fn report(&mut self, row: &RowView<'_>, name: &str, code: DiagnosticCode, message: String) {
        self.diags
            .push(&self.sheet.name, row.line(), name, code, message);
    }

    fn row(&mut self, row: RowView<'a>) {
        let Some(name) = row.non_blank(services::NAME) else {
            self.report(
                &row,
                "",
                DiagnosticCode::MissingName,
                "service row has no name".to_string(),
            );
            return;
        };
        let kind = match row.get(services::TYPE).parse::<ServiceKind>() {
            Ok(kind) => kind,
            Err(err) => {
                self.report(&row, name, DiagnosticCode::UnknownServiceType, err.to_string());
                return;
            }
        };
        if !self.seen.insert((kind, name)) {
            self.report(
                &row,
                name,
                DiagnosticCode::DuplicateName,
                format!("{kind} '{name}' already defined on an earlier row; row ignored"),
            );
            return;
        }

        match kind {
            ServiceKind::TcpService => self.port_service(&row, name, Protocol::Tcp),
            ServiceKind::UdpService => self.port_service(&row, name, Protocol::Udp),
            ServiceKind::ServiceGroup => self.service_group(&row, name),
            ServiceKind::IcmpType => self.icmp_type(&row, name),
            ServiceKind::IcmpGroup => self.icmp_group(&row, name),
        }
    }

    fn port_service(&mut self, row: &RowView<'_>, name: &str, protocol: Protocol) {
        match port_ranges(row) {
            Ok(port_ranges) => self.out.services.push(Service {
                name: name.to_string(),
                protocol,
                port_ranges,
            }),
            Err((code, message)) => self.report(row, name, code, message),
        }
    }

    fn service_group(&mut self, row: &RowView<'_>, name: &str) {
        let mut members = Vec::new();
        for member in dedup_tokens(split_cell(row.get(services::MEMBERS))) {
            if self.port_services.contains(member.as_str()) {
                members.push(member);
            } else {
                self.report(
                    row,
                    name,
                    DiagnosticCode::UnknownGroupMember,
                    format!("member '{member}' is not a valid TCP or UDP service on this sheet"),
                );
            }
        }
        if members.is_empty() {
            self.report(
                row,
                name,
                DiagnosticCode::NoMembers,
                "service group has no known members; row ignored".to_string(),
            );
            return;
        }
        self.out.service_groups.push(ServiceGroup {
            name: name.to_string(),
            services: members,
        });
    }

    fn icmp_type(&mut self, row: &RowView<'_>, name: &str) {
        let cell = row.get(services::ICMP_TYPE);
        let Some(icmp_type) = parse_port(cell).and_then(|v| u8::try_from(v).ok()) else {
            self.report(
                row,
                name,
                DiagnosticCode::InvalidIcmpType,
                format!("icmp type '{}' is not a number in 0-255", cell.trim()),
            );
            return;
        };
        self.out.applications.push(Application::icmp(name, icmp_type));

        let implicit = ApplicationGroup {
            name: name.to_string(),
            apps: vec![name.to_string()],
        };
        if is_emittable(&implicit) {
            self.out.application_groups.push(implicit);
        }
    }

    // Members are copied without checking that they exist.
    fn icmp_group(&mut self, row: &RowView<'_>, name: &str) {
        let apps = dedup_tokens(split_cell(row.get(services::MEMBERS)));
        if apps.is_empty() {
            self.report(
                row,
                name,
                DiagnosticCode::NoMembers,
                "application group has no members; row ignored".to_string(),
            );
            return;
        }
        self.out.application_groups.push(ApplicationGroup {
            name: name.to_string(),
            apps,
        });
    }
}
