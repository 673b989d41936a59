/// Words of the title kept in a slug
const SLUG_TITLE_WORDS: usize = 8;

/// Lowercase alphanumerics (any script) joined by single dashes
fn slugify(part: &str) -> String {
    let mut slug = String::with_capacity(part.len());
    let mut pending_dash = false;

    for c in part.chars().flat_map(char::to_lowercase) {
        // "H.R." reads as "hr", not "h-r"
        if c == '.' || c == '\'' {
            continue;
        }
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// URL-safe identifier for a bill, used as the base name of its artifacts
///
/// Empty when none of the parts has a letter or digit; renderers refuse to
/// write such a bill.
///
/// Example: ("H.R. 1234", "To amend the Internal Revenue Code", "ih")
/// -> "hr-1234-ih-to-amend-the-internal-revenue-code"
pub fn bill_slug(legis_num: &str, title: &str, bill_version: &str) -> String {
    let short_title = title
        .split_whitespace()
        .take(SLUG_TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    [legis_num, bill_version, short_title.as_str()]
        .iter()
        .map(|part| slugify(part))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Description of a GovInfo bill version code
pub fn bill_version_description(code: &str) -> Option<&'static str> {
    let description = match code.trim().to_lowercase().as_str() {
        "ah" => "Amendment in House",
        "ash" => "Additional Sponsors House",
        "ath" => "Agreed to House",
        "ats" => "Agreed to Senate",
        "cdh" => "Committee Discharged House",
        "cds" => "Committee Discharged Senate",
        "cph" => "Considered and Passed House",
        "cps" => "Considered and Passed Senate",
        "eah" => "Engrossed Amendment House",
        "eas" => "Engrossed Amendment Senate",
        "eh" => "Engrossed in House",
        "enr" => "Enrolled Bill",
        "es" => "Engrossed in Senate",
        "fah" => "Failed Amendment House",
        "fph" => "Failed Passage House",
        "fps" => "Failed Passage Senate",
        "hdh" => "Held at Desk House",
        "hds" => "Held at Desk Senate",
        "ih" => "Introduced in House",
        "iph" => "Indefinitely Postponed House",
        "ips" => "Indefinitely Postponed Senate",
        "is" => "Introduced in Senate",
        "lth" => "Laid on Table in House",
        "lts" => "Laid on Table in Senate",
        "oph" => "Ordered to be Printed House",
        "ops" => "Ordered to be Printed Senate",
        "pav" => "Previous Action Vitiated",
        "pch" => "Placed on Calendar House",
        "pcs" => "Placed on Calendar Senate",
        "pp" => "Public Print",
        "pwah" => "Ordered to be Printed with House Amendment",
        "rah" => "Referred with Amendments House",
        "ras" => "Referred with Amendments Senate",
        "rch" => "Reference Change House",
        "rcs" => "Reference Change Senate",
        "rdh" => "Received in House",
        "rds" => "Received in Senate",
        "re" => "Reprint of an Amendment",
        "reah" => "Re-engrossed Amendment House",
        "renr" => "Re-enrolled Bill",
        "res" => "Re-engrossed Amendment Senate",
        "rfh" => "Referred in House",
        "rfs" => "Referred in Senate",
        "rh" => "Reported in House",
        "rih" => "Referral Instructions House",
        "ris" => "Referral Instructions Senate",
        "rs" => "Reported in Senate",
        "rth" => "Referred to Committee House",
        "rts" => "Referred to Committee Senate",
        "sas" => "Additional Sponsors Senate",
        "sc" => "Sponsor Change",
        _ => return None,
    };
    Some(description)
}
