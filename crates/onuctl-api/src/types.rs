// Wire types for the device-control API.
//
// Field names follow the server's JSON exactly (a mix of lowercase and
// upper-case OLT terminology). Identifiers that the server emits either as
// numbers or as strings are normalized to `String` on the way in.

use serde::{Deserialize, Deserializer, Serialize};

// ── Lenient scalar decoding ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// Accept `"3"` or `3`, yielding `"3"`.
fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Scalar::deserialize(de).map(Scalar::into_string)
}

/// Optional variant of [`string_or_number`]; `null` and absent map to `None`.
fn opt_string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(de)?
        .map(Scalar::into_string)
        .filter(|s| !s.is_empty()))
}

/// Accept `-20.5`, `"-20.5"`, or `null`. Unparseable strings become `None`.
fn opt_lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Scalar>::deserialize(de)? {
        Some(Scalar::Int(n)) => Some(n as f64),
        Some(Scalar::Float(f)) => Some(f),
        Some(Scalar::Str(s)) => s.trim().parse().ok(),
        Some(Scalar::Bool(_)) | None => None,
    })
}

// ── Auth ─────────────────────────────────────────────────────────────

/// `POST /login` form body.
#[derive(Debug, Serialize)]
pub(crate) struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /login` success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// One OLT from `GET /device`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// `GET /device/{id}/status` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceStatusRecord {
    #[serde(default)]
    pub status: Option<String>,
}

/// A service profile (VLAN binding) from `GET /device/{id}/services`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceRecord {
    pub id: u32,
    pub vlan: u16,
}

// ── ONU ──────────────────────────────────────────────────────────────

/// One unregistered ONU from `GET /device/{id}/onu/autofind`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AutofindRecord {
    #[serde(rename = "Number", default, deserialize_with = "opt_string_or_number")]
    pub number: Option<String>,
    #[serde(rename = "SN")]
    pub sn: String,
    #[serde(rename = "FSP", default)]
    pub fsp: String,
    #[serde(rename = "ONTID", default, deserialize_with = "opt_string_or_number")]
    pub ontid: Option<String>,
    #[serde(rename = "VendorSN", default)]
    pub vendor_sn: Option<String>,
    #[serde(rename = "VendorID", default)]
    pub vendor_id: Option<String>,
    #[serde(rename = "Model", default)]
    pub model: Option<String>,
}

/// `POST /device/{id}/onu/search/sn` request body.
#[derive(Debug, Serialize)]
pub(crate) struct SnQuery<'a> {
    pub sn: &'a str,
}

/// A registered ONU from `POST /device/{id}/onu/search/sn`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SnRecord {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "FSP", default)]
    pub fsp: Option<String>,
    #[serde(rename = "SN", default)]
    pub sn: Option<String>,
    #[serde(rename = "ONTID", default, deserialize_with = "opt_string_or_number")]
    pub ontid: Option<String>,
    #[serde(rename = "VendorSN", default)]
    pub vendor_sn: Option<String>,
    #[serde(rename = "LineProfile", default, deserialize_with = "opt_string_or_number")]
    pub line_profile: Option<String>,
}

/// `POST /device/{id}/onu/add` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddOnuRequest {
    pub description: String,
    #[serde(rename = "SN")]
    pub sn: String,
    #[serde(rename = "FSP")]
    pub fsp: String,
    pub nativevlan: bool,
    pub service_id: u32,
    pub interface: String,
    pub port: String,
}

/// `POST /device/{id}/onu/add` success payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddOnuResponse {
    #[serde(rename = "ONTID", default, deserialize_with = "opt_string_or_number")]
    pub ontid: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `DELETE /device/{id}/onu/delete` request body.
///
/// Operators delete by serial alone; the conflict resolver sends the full
/// stale record it found so the OLT removes exactly that registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DeleteOnuRequest {
    Serial {
        sn: String,
    },
    Record {
        #[serde(rename = "SN")]
        sn: String,
        #[serde(rename = "ONTID")]
        ontid: String,
        #[serde(rename = "FSP")]
        fsp: String,
        #[serde(rename = "Description")]
        description: String,
    },
}

/// `{FSP, ONTID}` body shared by reset and optical endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnuLocator {
    #[serde(rename = "FSP")]
    pub fsp: String,
    #[serde(rename = "ONTID")]
    pub ontid: String,
}

/// `POST /device/{id}/onu/optical` payload (dBm).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OpticalRecord {
    #[serde(rename = "ONU_RX", default, deserialize_with = "opt_lenient_f64")]
    pub onu_rx: Option<f64>,
    #[serde(rename = "OLT_RX", default, deserialize_with = "opt_lenient_f64")]
    pub olt_rx: Option<f64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sn_record_accepts_numeric_ontid() {
        let rec: SnRecord = serde_json::from_value(json!({
            "status": "online",
            "Description": "user1",
            "FSP": "0/1/2",
            "SN": "HWTC1234567890AB",
            "ONTID": 7,
            "VendorSN": "HWTC-12345678",
            "LineProfile": "ftth"
        }))
        .unwrap();
        assert_eq!(rec.ontid.as_deref(), Some("7"));
        assert_eq!(rec.description.as_deref(), Some("user1"));
    }

    #[test]
    fn optical_record_parses_numeric_strings_and_nulls() {
        let rec: OpticalRecord =
            serde_json::from_value(json!({ "ONU_RX": "-21.34", "OLT_RX": null })).unwrap();
        assert_eq!(rec.onu_rx, Some(-21.34));
        assert_eq!(rec.olt_rx, None);
    }

    #[test]
    fn delete_request_serializes_both_shapes() {
        let by_sn = DeleteOnuRequest::Serial { sn: "ABC".into() };
        assert_eq!(serde_json::to_value(&by_sn).unwrap(), json!({ "sn": "ABC" }));

        let record = DeleteOnuRequest::Record {
            sn: "ABC".into(),
            ontid: "4".into(),
            fsp: "0/1/2".into(),
            description: "old".into(),
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({ "SN": "ABC", "ONTID": "4", "FSP": "0/1/2", "Description": "old" })
        );
    }

    #[test]
    fn device_record_accepts_numeric_id() {
        let rec: DeviceRecord =
            serde_json::from_value(json!({ "id": 3, "name": "OLT-A", "vendor": "Huawei" }))
                .unwrap();
        assert_eq!(rec.id, "3");
        assert_eq!(rec.model, None);
    }
}
