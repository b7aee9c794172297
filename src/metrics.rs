//! Prometheus text-exposition rendering.
//!
//! Metric and label names are a compatibility contract with existing
//! dashboards and alert rules (including the long-standing
//! `megaraid_roc_temp_celcius` spelling); never rename them.

use crate::extract::Inventory;

/// Render all metric families. Every family gets its HELP/TYPE header even
/// when it has no samples, so a scrape of an empty host still parses.
pub fn render(inv: &Inventory) -> String {
    let mut out = String::new();

    out.push_str("# HELP megaraid_controllers MegaRAID controllers\n");
    out.push_str("# TYPE megaraid_controllers gauge\n");
    for c in &inv.controllers {
        out.push_str(&format!(
            "megaraid_controllers{{controller=\"{}\",model=\"{}\"}} 1\n",
            c.id,
            escape_label(&c.model)
        ));
    }

    out.push_str("# HELP megaraid_controller_memory_errors MegaRAID controller memory errors\n");
    out.push_str("# TYPE megaraid_controller_memory_errors counter\n");
    for c in &inv.controllers {
        out.push_str(&format!(
            "megaraid_controller_memory_errors{{controller=\"{}\",correctable=\"y\"}} {}\n",
            c.id, c.correctable_errors
        ));
        out.push_str(&format!(
            "megaraid_controller_memory_errors{{controller=\"{}\",correctable=\"n\"}} {}\n",
            c.id, c.uncorrectable_errors
        ));
    }

    out.push_str("# HELP megaraid_controller_bbu MegaRAID controller BBU presence\n");
    out.push_str("# TYPE megaraid_controller_bbu gauge\n");
    for c in &inv.controllers {
        out.push_str(&format!(
            "megaraid_controller_bbu{{controller=\"{}\"}} {}\n",
            c.id, c.bbu_present as u8
        ));
    }

    out.push_str("# HELP megaraid_roc_temp_celcius MegaRAID controller ROC temperature\n");
    out.push_str("# TYPE megaraid_roc_temp_celcius gauge\n");
    for c in &inv.controllers {
        out.push_str(&format!(
            "megaraid_roc_temp_celcius{{controller=\"{}\"}} {}\n",
            c.id, c.roc_temp_celsius
        ));
    }

    out.push_str("# HELP megaraid_virtual_drives MegaRAID virtual drives\n");
    out.push_str("# TYPE megaraid_virtual_drives gauge\n");
    for vd in &inv.virtual_drives {
        out.push_str(&format!(
            "megaraid_virtual_drives{{controller=\"{}\",vd=\"{}\",type=\"{}\",state=\"{}\"}} 1\n",
            vd.controller,
            vd.id,
            escape_label(&vd.raid_type),
            escape_label(&vd.state)
        ));
    }

    out.push_str("# HELP megaraid_vd_size_bytes MegaRAID virtual drive size\n");
    out.push_str("# TYPE megaraid_vd_size_bytes gauge\n");
    for vd in &inv.virtual_drives {
        out.push_str(&format!(
            "megaraid_vd_size_bytes{{controller=\"{}\",vd=\"{}\"}} {}\n",
            vd.controller, vd.id, vd.size_bytes
        ));
    }

    out.push_str("# HELP megaraid_physical_drives MegaRAID physical drives\n");
    out.push_str("# TYPE megaraid_physical_drives gauge\n");
    for pd in &inv.physical_drives {
        // Empty vd label for drives backing no virtual drive.
        let vd = pd.virtual_drive.map(|v| v.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "megaraid_physical_drives{{controller=\"{}\",enclosure=\"{}\",slot=\"{}\",vd=\"{}\",state=\"{}\"}} 1\n",
            pd.controller,
            pd.enclosure,
            pd.slot,
            vd,
            escape_label(&pd.state)
        ));
    }

    out.push_str("# HELP megaraid_pd_size_bytes MegaRAID physical drive size\n");
    out.push_str("# TYPE megaraid_pd_size_bytes gauge\n");
    for pd in &inv.physical_drives {
        out.push_str(&format!(
            "megaraid_pd_size_bytes{{controller=\"{}\",enclosure=\"{}\",slot=\"{}\"}} {}\n",
            pd.controller, pd.enclosure, pd.slot, pd.size_bytes
        ));
    }

    out
}

/// Escape a label value per the exposition format: backslash, double
/// quote, and newline.
fn escape_label(v: &str) -> String {
    let mut s = String::with_capacity(v.len());
    for c in v.chars() {
        match c {
            '\\' => s.push_str("\\\\"),
            '"'  => s.push_str("\\\""),
            '\n' => s.push_str("\\n"),
            _    => s.push(c),
        }
    }
    s
}
