use std::collections::BTreeMap;

use anyhow::Context;
use serde::Deserialize;

use crate::ir::{Company, Holder, Involvement, ShareAmounts, ShareClass, ShareClassName, Snapshot};

// Upstream numbers arrive as numbers, numeric strings or null depending on the
// record's age; everything unusable collapses to zero downstream.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().parse::<f64>().ok(),
        }?;
        value.is_finite().then_some(value)
    }

    fn as_count(&self) -> u64 {
        match self.as_f64() {
            Some(value) if value > 0.0 => value.round() as u64,
            _ => 0,
        }
    }

    fn as_string(&self) -> String {
        match self {
            NumberOrString::Number(val) => format!("{}", val),
            NumberOrString::String(val) => val.clone(),
        }
    }
}

fn count(value: &Option<NumberOrString>) -> u64 {
    value.as_ref().map(NumberOrString::as_count).unwrap_or(0)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    company: CompanyFile,
    #[serde(default, alias = "relations")]
    involvements: Vec<InvolvementFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyFile {
    id: Option<NumberOrString>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    authorized_shares: Option<NumberOrString>,
    issued_shares: Option<NumberOrString>,
    #[serde(default)]
    share_classes: Vec<ShareClassFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareClassFile {
    #[serde(alias = "className", alias = "class")]
    name: String,
    #[serde(alias = "issuedShares", alias = "amount")]
    issued: Option<NumberOrString>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartyFile {
    name: Option<String>,
    address: Option<String>,
    nationality: Option<String>,
    registration_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvolvementFile {
    id: Option<NumberOrString>,
    #[serde(rename = "type", alias = "holderType")]
    holder_type: Option<String>,
    person: Option<PartyFile>,
    company: Option<PartyFile>,
    name: Option<String>,
    address: Option<String>,
    nationality: Option<String>,
    #[serde(default)]
    shares: BTreeMap<String, Option<NumberOrString>>,
    share_percentage: Option<NumberOrString>,
    #[serde(alias = "role")]
    roles: Option<OneOrMany>,
}

/// Parses one company snapshot in the remote API's JSON shape.
///
/// Only a malformed document is an error; missing or unusable numbers become 0.
pub fn parse_snapshot(input: &str) -> anyhow::Result<Snapshot> {
    let file: SnapshotFile =
        serde_json::from_str(input).context("snapshot is not valid JSON")?;
    Ok(snapshot_from_file(file))
}

fn snapshot_from_file(file: SnapshotFile) -> Snapshot {
    let company = company_from_file(file.company);
    let involvements = file
        .involvements
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| involvement_from_file(idx, raw))
        .collect();
    Snapshot::new(company, involvements)
}

fn company_from_file(raw: CompanyFile) -> Company {
    let share_classes = raw
        .share_classes
        .into_iter()
        .map(|class| ShareClass {
            name: ShareClassName::from_label(&class.name),
            issued: count(&class.issued),
        })
        .collect();
    Company {
        id: raw.id.map(|id| id.as_string()).unwrap_or_default(),
        name: raw.name.unwrap_or_default(),
        address: raw.address.unwrap_or_default(),
        authorized_shares: count(&raw.authorized_shares),
        issued_shares: count(&raw.issued_shares),
        share_classes,
    }
}

fn involvement_from_file(idx: usize, raw: InvolvementFile) -> Involvement {
    let is_company = raw
        .holder_type
        .as_deref()
        .map(|kind| kind.trim().eq_ignore_ascii_case("company"))
        .unwrap_or(false);
    let party = if is_company {
        raw.company.or(raw.person)
    } else {
        raw.person.or(raw.company)
    };
    let (party_name, party_address, party_nationality, registration_number) = match party {
        Some(party) => (
            party.name,
            party.address,
            party.nationality,
            party.registration_number,
        ),
        None => (None, None, None, None),
    };
    let name = party_name.or(raw.name).unwrap_or_default();
    let address = party_address.or(raw.address).unwrap_or_default();
    let holder = if is_company {
        Holder::Company {
            name,
            address,
            registration_number,
        }
    } else {
        Holder::Person {
            name,
            address,
            nationality: party_nationality.or(raw.nationality),
        }
    };

    let mut shares = ShareAmounts::new();
    for (label, amount) in &raw.shares {
        let class = ShareClassName::from_label(label);
        let amount = shares.get(&class).saturating_add(count(amount));
        shares.set(class, amount);
    }

    let roles = match raw.roles {
        Some(OneOrMany::One(role)) => role
            .split(',')
            .map(|role| role.trim().to_string())
            .filter(|role| !role.is_empty())
            .collect(),
        Some(OneOrMany::Many(roles)) => roles,
        None => Vec::new(),
    };

    Involvement {
        id: raw
            .id
            .map(|id| id.as_string())
            .unwrap_or_else(|| format!("involvement-{}", idx + 1)),
        holder,
        shares,
        share_percentage: raw.share_percentage.as_ref().and_then(NumberOrString::as_f64),
        roles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::HolderKind;

    #[test]
    fn huge_counts_saturate() {
        let input = r#"{
            "company": {"id": "x", "name": "Big plc"},
            "involvements": [
                {"id": "1", "name": "Ada", "shares": {"A": 1e19, "Class A": 1e19, "Ordinary": 1e19}}
            ]
        }"#;
        let snapshot = parse_snapshot(input).unwrap();
        let holder = &snapshot.involvements[0];
        assert_eq!(holder.shares.get(&ShareClassName::A), u64::MAX);
        assert_eq!(holder.total_shares(), u64::MAX);
    }

    #[test]
    fn parses_api_shape() {
        let input = r#"{
            "company": {
                "id": 7,
                "name": "Acme Ltd",
                "authorizedShares": "1000",
                "issuedShares": 600,
                "shareClasses": [{"name": "Ordinary", "issued": 500}, {"name": "A", "issued": 100}]
            },
            "involvements": [
                {"id": "p1", "type": "PERSON", "person": {"name": "Ada", "nationality": "GB"},
                 "shares": {"Ordinary": 300, "A": 100}, "roles": ["director", "shareholder"]},
                {"id": "c1", "type": "COMPANY", "company": {"name": "Holdco", "address": "1 Road"},
                 "shares": {"Ordinary": "200"}}
            ]
        }"#;
        let snapshot = parse_snapshot(input).unwrap();
        assert_eq!(snapshot.company.id, "7");
        assert_eq!(snapshot.company.authorized_shares, 1000);
        assert_eq!(snapshot.company.class_total(&ShareClassName::A), 100);
        assert_eq!(snapshot.involvements.len(), 2);
        let ada = &snapshot.involvements[0];
        assert_eq!(ada.holder.display_name(), "Ada");
        assert_eq!(ada.total_shares(), 400);
        assert_eq!(ada.roles.len(), 2);
        let holdco = &snapshot.involvements[1];
        assert_eq!(holdco.holder.kind(), HolderKind::Company);
        assert_eq!(holdco.holder.address(), "1 Road");
        assert_eq!(holdco.shares.get(&ShareClassName::Ordinary), 200);
    }

    #[test]
    fn unusable_numbers_default_to_zero() {
        let input = r#"{
            "company": {"name": "Acme", "issuedShares": null, "authorizedShares": "lots"},
            "involvements": [
                {"name": "Bo", "shares": {"A": -5, "B": null, "C": "x"}, "sharePercentage": "12.5",
                 "roles": "Director, Secretary"}
            ]
        }"#;
        let snapshot = parse_snapshot(input).unwrap();
        assert_eq!(snapshot.company.issued_shares, 0);
        assert_eq!(snapshot.company.authorized_shares, 0);
        let bo = &snapshot.involvements[0];
        assert_eq!(bo.id, "involvement-1");
        assert_eq!(bo.holder.kind(), HolderKind::Person);
        assert_eq!(bo.total_shares(), 0);
        assert_eq!(bo.share_percentage, Some(12.5));
        assert_eq!(bo.roles, vec!["Director", "Secretary"]);
    }

    #[test]
    fn rejects_malformed_document() {
        assert!(parse_snapshot("{ company: ").is_err());
    }
}
