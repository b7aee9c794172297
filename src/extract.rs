//! Core extraction pipeline: sanitize raw StorCLI output, decode it as
//! JSON, and project controller / virtual-drive / physical-drive entities
//! out of the loosely-typed report.
//!
//! Pure: bytes in, entity collections out. No I/O happens here, which is
//! what makes the pipeline testable without a MegaRAID card.

use crate::error::ReportError;
use crate::models::raid::{Controller, PhysicalDrive, VirtualDrive};
use crate::util::size::parse_size;
use serde_json::Value;
use std::collections::HashMap;

/// One run's worth of extracted entities, in report order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub controllers:     Vec<Controller>,
    pub virtual_drives:  Vec<VirtualDrive>,
    pub physical_drives: Vec<PhysicalDrive>,
}

/// Strip control and high bytes ([0x00-0x1F], [0x7F-0xFF]) from the raw
/// report. Some firmware revisions leak terminal control sequences and
/// high-byte garbage into the JSON; dropping those bytes up front keeps
/// the decoder from choking on an otherwise-usable report.
pub fn sanitize(raw: &[u8]) -> String {
    raw.iter()
        .copied()
        .filter(|b| (0x20..0x7F).contains(b))
        .map(char::from)
        .collect()
}

/// Parse a raw report and extract all entities.
///
/// Fail-fast: the first malformed record anywhere aborts the run. The one
/// tolerated condition is a Controllers entry without "Response Data",
/// which is StorCLI's own "controller could not be queried" signal and
/// contributes zero entities.
pub fn extract(raw: &[u8]) -> Result<Inventory, ReportError> {
    let text = sanitize(raw);
    let doc: Value =
        serde_json::from_str(&text).map_err(|e| ReportError::MalformedReport(e.to_string()))?;

    let entries = match &doc["Controllers"] {
        Value::Array(a) => a,
        Value::Null => return Err(ReportError::MissingField("Controllers".into())),
        other => {
            return Err(ReportError::MalformedReport(format!(
                "\"Controllers\" is not an array: {other}"
            )))
        }
    };

    let mut inv = Inventory::default();
    for (index, entry) in entries.iter().enumerate() {
        let resp = &entry["Response Data"];
        if !usable(resp) {
            continue;
        }

        let controller = extract_controller(resp, index)?;
        let (vds, dg_map) = extract_virtual_drives(resp, controller.id)?;
        let pds = extract_physical_drives(resp, controller.id, &dg_map)?;

        inv.controllers.push(controller);
        inv.virtual_drives.extend(vds);
        inv.physical_drives.extend(pds);
    }
    Ok(inv)
}

/// A query-failure entry carries only "Command Status"; its response
/// section is absent, null, or an empty object.
fn usable(resp: &Value) -> bool {
    match resp {
        Value::Object(m) => !m.is_empty(),
        _ => false,
    }
}

fn extract_controller(resp: &Value, index: usize) -> Result<Controller, ReportError> {
    Ok(Controller {
        id:                   int_field(resp, "Basics", "Controller", index)?,
        model:                str_field(resp, "Basics", "Model", index)?,
        correctable_errors:   int_field(resp, "Status", "Memory Correctable Errors", index)?,
        uncorrectable_errors: int_field(resp, "Status", "Memory Uncorrectable Errors", index)?,
        bbu_present:          str_field(resp, "HwCfg", "BBU", index)? != "Absent",
        roc_temp_celsius:     roc_temperature(resp)?,
    })
}

/// Build this controller's VD list and the drive-group -> VD-id map used
/// to resolve physical drives. The map is rebuilt fresh per controller.
fn extract_virtual_drives(
    resp: &Value,
    controller: u64,
) -> Result<(Vec<VirtualDrive>, HashMap<u64, u64>), ReportError> {
    let mut vds = Vec::new();
    let mut dg_map = HashMap::new();

    for vd in list(resp, "VD LIST") {
        let (drive_group, id) = split_pair(&entry_str(vd, "DG/VD")?, '/')?;
        dg_map.insert(drive_group, id);
        vds.push(VirtualDrive {
            controller,
            drive_group,
            id,
            raid_type:  entry_str(vd, "TYPE")?,
            state:      entry_str(vd, "State")?.to_lowercase(),
            size_bytes: parse_size(&entry_str(vd, "Size")?)?,
        });
    }
    Ok((vds, dg_map))
}

fn extract_physical_drives(
    resp: &Value,
    controller: u64,
    dg_map: &HashMap<u64, u64>,
) -> Result<Vec<PhysicalDrive>, ReportError> {
    let mut pds = Vec::new();

    for pd in list(resp, "PD LIST") {
        let (enclosure, slot) = split_pair(&entry_str(pd, "EID:Slt")?, ':')?;
        let drive_group = parse_drive_group(&pd["DG"])?;
        pds.push(PhysicalDrive {
            controller,
            enclosure,
            slot,
            drive_group,
            // Pure lookup. A group with no VD behind it (hot spare,
            // foreign config) resolves to None rather than failing the
            // run.
            virtual_drive: drive_group.and_then(|dg| dg_map.get(&dg).copied()),
            state:         entry_str(pd, "State")?.to_lowercase(),
            size_bytes:    parse_size(&entry_str(pd, "Size")?)?,
        });
    }
    Ok(pds)
}

/// "DG" is an integer, or "-" for a drive that backs no drive group.
fn parse_drive_group(v: &Value) -> Result<Option<u64>, ReportError> {
    match v {
        Value::Null => Err(ReportError::MissingField("DG".into())),
        Value::String(s) if s.trim() == "-" => Ok(None),
        other => int_value(other)
            .map(Some)
            .ok_or_else(|| ReportError::MalformedReport(format!("DG is not an integer: {other}"))),
    }
}

/// Split a composite "N/M" or "N:M" token into its two integers.
fn split_pair(token: &str, sep: char) -> Result<(u64, u64), ReportError> {
    let malformed =
        || ReportError::MalformedReport(format!("expected <int>{sep}<int>, got {token:?}"));

    let (a, b) = token.split_once(sep).ok_or_else(malformed)?;
    let a = a.trim().parse().map_err(|_| malformed())?;
    let b = b.trim().parse().map_err(|_| malformed())?;
    Ok((a, b))
}

/// Not reported by older ROC firmware; absent means "no sensor", 0.
fn roc_temperature(resp: &Value) -> Result<i64, ReportError> {
    let v = &resp["HwCfg"]["ROC temperature(Degree Celsius)"];
    if v.is_null() {
        return Ok(0);
    }
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        ReportError::MalformedReport(format!("ROC temperature is not an integer: {v}"))
    })
}

/// Project a required integer field that may arrive as a JSON number or a
/// numeric string, depending on firmware.
fn int_field(resp: &Value, section: &str, key: &str, index: usize) -> Result<u64, ReportError> {
    let v = field(resp, section, key, index)?;
    int_value(v).ok_or_else(|| {
        ReportError::MalformedReport(format!(
            "{section}.{key} in controller entry {index} is not an integer: {v}"
        ))
    })
}

fn str_field(resp: &Value, section: &str, key: &str, index: usize) -> Result<String, ReportError> {
    let v = field(resp, section, key, index)?;
    v.as_str().map(str::to_string).ok_or_else(|| {
        ReportError::MalformedReport(format!(
            "{section}.{key} in controller entry {index} is not a string: {v}"
        ))
    })
}

fn field<'a>(
    resp: &'a Value,
    section: &str,
    key: &str,
    index: usize,
) -> Result<&'a Value, ReportError> {
    let v = &resp[section][key];
    if v.is_null() {
        return Err(ReportError::MissingField(format!(
            "{section}.{key} (controller entry {index})"
        )));
    }
    Ok(v)
}

/// Required key on a VD/PD list entry.
fn entry_str(entry: &Value, key: &str) -> Result<String, ReportError> {
    match &entry[key] {
        Value::Null => Err(ReportError::MissingField(key.to_string())),
        Value::String(s) => Ok(s.clone()),
        other => Err(ReportError::MalformedReport(format!(
            "{key} is not a string: {other}"
        ))),
    }
}

fn int_value(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// "VD LIST" / "PD LIST" are omitted entirely on controllers with no
/// configured arrays; treat absence as an empty list.
fn list<'a>(resp: &'a Value, key: &str) -> &'a [Value] {
    resp[key].as_array().map(Vec::as_slice).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_CTRL: &str = r#"{
        "Response Data": {
            "Basics": {"Controller": "0", "Model": "AVAGO MegaRAID SAS 9361-8i"},
            "Status": {"Memory Correctable Errors": "0", "Memory Uncorrectable Errors": "1"},
            "HwCfg": {"BBU": "Present", "ROC temperature(Degree Celsius)": "61"},
            "VD LIST": [
                {"DG/VD": "0/5", "TYPE": "RAID1", "State": "Optl", "Size": "278.875 GB"}
            ],
            "PD LIST": [
                {"EID:Slt": "252:0", "DG": "0", "State": "Onln", "Size": "278.875 GB"},
                {"EID:Slt": "252:1", "DG": "-", "State": "UGood", "Size": "2.500 TB"}
            ]
        }
    }"#;

    const FAILED_CTRL: &str =
        r#"{"Command Status": {"Status": "Failure", "Description": "No Controller found"}}"#;

    fn report(entries: &[&str]) -> Vec<u8> {
        format!(r#"{{"Controllers":[{}]}}"#, entries.join(",")).into_bytes()
    }

    #[test]
    fn sanitize_strips_control_and_high_bytes() {
        let raw = b"\x00\x1b[2Jab\tc\r\nd\x7f\xff";
        assert_eq!(sanitize(raw), "[2Jabcd");
    }

    #[test]
    fn sanitize_keeps_printable_ascii_untouched() {
        let raw = br#"{"Controllers": []} ~"#;
        assert_eq!(sanitize(raw), r#"{"Controllers": []} ~"#);
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(
            extract(b""),
            Err(ReportError::MalformedReport(_))
        ));
    }

    #[test]
    fn fully_corrupt_input_sanitizes_to_nothing_and_is_malformed() {
        assert!(matches!(
            extract(b"\x01\x02\xfe\xff"),
            Err(ReportError::MalformedReport(_))
        ));
    }

    #[test]
    fn missing_controllers_key() {
        assert_eq!(
            extract(br#"{"Version": 7}"#),
            Err(ReportError::MissingField("Controllers".into()))
        );
    }

    #[test]
    fn failed_controller_contributes_nothing() {
        let inv = extract(&report(&[FAILED_CTRL])).unwrap();
        assert_eq!(inv, Inventory::default());
    }

    #[test]
    fn extracts_controller_fields() {
        let inv = extract(&report(&[GOOD_CTRL])).unwrap();
        assert_eq!(inv.controllers.len(), 1);

        let c = &inv.controllers[0];
        assert_eq!(c.id, 0);
        assert_eq!(c.model, "AVAGO MegaRAID SAS 9361-8i");
        assert_eq!(c.correctable_errors, 0);
        assert_eq!(c.uncorrectable_errors, 1);
        assert!(c.bbu_present);
        assert_eq!(c.roc_temp_celsius, 61);
    }

    #[test]
    fn extracts_virtual_drives() {
        let inv = extract(&report(&[GOOD_CTRL])).unwrap();
        assert_eq!(inv.virtual_drives.len(), 1);

        let vd = &inv.virtual_drives[0];
        assert_eq!((vd.controller, vd.drive_group, vd.id), (0, 0, 5));
        assert_eq!(vd.raid_type, "RAID1");
        assert_eq!(vd.state, "optl");
        assert_eq!(vd.size_bytes, 299_439_751_168);
    }

    #[test]
    fn resolves_drive_group_to_virtual_drive() {
        let inv = extract(&report(&[GOOD_CTRL])).unwrap();
        assert_eq!(inv.physical_drives.len(), 2);

        let member = &inv.physical_drives[0];
        assert_eq!((member.enclosure, member.slot), (252, 0));
        assert_eq!(member.drive_group, Some(0));
        assert_eq!(member.virtual_drive, Some(5));
        assert_eq!(member.state, "onln");

        let spare = &inv.physical_drives[1];
        assert_eq!(spare.drive_group, None);
        assert_eq!(spare.virtual_drive, None);
        assert_eq!(spare.state, "ugood");
        assert_eq!(spare.size_bytes, 2_748_779_069_440);
    }

    #[test]
    fn drive_group_absent_from_map_resolves_to_none() {
        // DG 3 exists on the PD but no VD claims it: lookup miss, not an
        // error.
        let ctrl = r#"{
            "Response Data": {
                "Basics": {"Controller": "1", "Model": "PERC H740P"},
                "Status": {"Memory Correctable Errors": "0", "Memory Uncorrectable Errors": "0"},
                "HwCfg": {"BBU": "Absent"},
                "PD LIST": [
                    {"EID:Slt": "32:4", "DG": "3", "State": "GHS", "Size": "1.090 TB"}
                ]
            }
        }"#;
        let inv = extract(&report(&[ctrl])).unwrap();
        assert_eq!(inv.virtual_drives.len(), 0);
        assert_eq!(inv.physical_drives[0].drive_group, Some(3));
        assert_eq!(inv.physical_drives[0].virtual_drive, None);
        assert_eq!(inv.physical_drives[0].state, "ghs");
        // BBU "Absent" and no temperature sensor
        assert!(!inv.controllers[0].bbu_present);
        assert_eq!(inv.controllers[0].roc_temp_celsius, 0);
    }

    #[test]
    fn accepts_json_numbers_for_numeric_fields() {
        let ctrl = r#"{
            "Response Data": {
                "Basics": {"Controller": 2, "Model": "LSI 9271-8i"},
                "Status": {"Memory Correctable Errors": 7, "Memory Uncorrectable Errors": 0},
                "HwCfg": {"BBU": "Present", "ROC temperature(Degree Celsius)": 58}
            }
        }"#;
        let inv = extract(&report(&[ctrl])).unwrap();
        let c = &inv.controllers[0];
        assert_eq!((c.id, c.correctable_errors, c.roc_temp_celsius), (2, 7, 58));
    }

    #[test]
    fn missing_required_field_names_it() {
        let ctrl = r#"{
            "Response Data": {
                "Basics": {"Controller": "0"},
                "Status": {"Memory Correctable Errors": "0", "Memory Uncorrectable Errors": "0"},
                "HwCfg": {"BBU": "Present"}
            }
        }"#;
        let err = extract(&report(&[ctrl])).unwrap_err();
        assert_eq!(
            err,
            ReportError::MissingField("Basics.Model (controller entry 0)".into())
        );
    }

    #[test]
    fn malformed_composite_token_is_fatal() {
        let ctrl = r#"{
            "Response Data": {
                "Basics": {"Controller": "0", "Model": "X"},
                "Status": {"Memory Correctable Errors": "0", "Memory Uncorrectable Errors": "0"},
                "HwCfg": {"BBU": "Present"},
                "VD LIST": [
                    {"DG/VD": "zero/five", "TYPE": "RAID0", "State": "Optl", "Size": "1.000 GB"}
                ]
            }
        }"#;
        assert!(matches!(
            extract(&report(&[ctrl])),
            Err(ReportError::MalformedReport(_))
        ));
    }

    #[test]
    fn bad_size_string_is_fatal() {
        let ctrl = r#"{
            "Response Data": {
                "Basics": {"Controller": "0", "Model": "X"},
                "Status": {"Memory Correctable Errors": "0", "Memory Uncorrectable Errors": "0"},
                "HwCfg": {"BBU": "Present"},
                "VD LIST": [
                    {"DG/VD": "0/0", "TYPE": "RAID0", "State": "Optl", "Size": "1 GB"}
                ]
            }
        }"#;
        assert_eq!(
            extract(&report(&[ctrl])),
            Err(ReportError::MalformedSize("1 GB".into()))
        );
    }

    #[test]
    fn mixed_success_and_failure_entries() {
        let inv = extract(&report(&[GOOD_CTRL, FAILED_CTRL])).unwrap();
        assert_eq!(inv.controllers.len(), 1);
        assert_eq!(inv.virtual_drives.len(), 1);
        assert_eq!(inv.physical_drives.len(), 2);
    }

    #[test]
    fn extraction_is_deterministic() {
        let raw = report(&[GOOD_CTRL, FAILED_CTRL]);
        assert_eq!(extract(&raw).unwrap(), extract(&raw).unwrap());
    }
}
