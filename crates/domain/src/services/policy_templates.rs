//! Built-in policy templates.
//!
//! Templates are Markdown with `{company_name}` and `{date}` placeholders.
//! Unknown policy types fall back to a generic skeleton.

use chrono::NaiveDate;

/// A built-in template.
#[derive(Debug, Clone, Copy)]
pub struct PolicyTemplate {
    pub policy_type: &'static str,
    pub title: &'static str,
    body: &'static str,
}

/// Title and rendered Markdown of a generated policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPolicy {
    pub title: String,
    pub content: String,
}

pub const TEMPLATES: &[PolicyTemplate] = &[
    PolicyTemplate {
        policy_type: "information_security",
        title: "Information Security Policy",
        body: include_str!("../../templates/policies/information_security.md"),
    },
    PolicyTemplate {
        policy_type: "access_control",
        title: "Access Control Policy",
        body: include_str!("../../templates/policies/access_control.md"),
    },
    PolicyTemplate {
        policy_type: "incident_response",
        title: "Incident Response Policy",
        body: include_str!("../../templates/policies/incident_response.md"),
    },
    PolicyTemplate {
        policy_type: "data_protection",
        title: "Data Protection Policy",
        body: include_str!("../../templates/policies/data_protection.md"),
    },
    PolicyTemplate {
        policy_type: "acceptable_use",
        title: "Acceptable Use Policy",
        body: include_str!("../../templates/policies/acceptable_use.md"),
    },
    PolicyTemplate {
        policy_type: "business_continuity",
        title: "Business Continuity Policy",
        body: include_str!("../../templates/policies/business_continuity.md"),
    },
    PolicyTemplate {
        policy_type: "vendor_management",
        title: "Vendor Management Policy",
        body: include_str!("../../templates/policies/vendor_management.md"),
    },
    PolicyTemplate {
        policy_type: "change_management",
        title: "Change Management Policy",
        body: include_str!("../../templates/policies/change_management.md"),
    },
    PolicyTemplate {
        policy_type: "encryption",
        title: "Encryption Policy",
        body: include_str!("../../templates/policies/encryption.md"),
    },
];

pub fn find_template(policy_type: &str) -> Option<&'static PolicyTemplate> {
    let wanted = policy_type.trim().to_lowercase();
    TEMPLATES.iter().find(|t| t.policy_type == wanted)
}

/// Generates a policy document for `company_name`, dated `date`.
pub fn generate_policy(policy_type: &str, company_name: &str, date: NaiveDate) -> GeneratedPolicy {
    let date = date.format("%Y-%m-%d").to_string();
    match find_template(policy_type) {
        Some(template) => GeneratedPolicy {
            title: template.title.to_string(),
            content: fill(template.body, company_name, &date),
        },
        None => generic_policy(policy_type, company_name, &date),
    }
}

fn fill(body: &str, company_name: &str, date: &str) -> String {
    body.replace("{company_name}", company_name)
        .replace("{date}", date)
}

fn generic_policy(policy_type: &str, company_name: &str, date: &str) -> GeneratedPolicy {
    let subject = policy_type.trim().replace('_', " ");
    let title = format!("{} Policy", title_case(&subject));
    let content = format!(
        "# {title}\n\n\
         ## 1. Purpose\n\n\
         This policy establishes guidelines for {subject} at {company_name}.\n\n\
         ## 2. Scope\n\n\
         This policy applies to all employees and contractors of {company_name}.\n\n\
         ## 3. Policy\n\n\
         [Policy content to be developed]\n\n\
         ## 4. Responsibilities\n\n\
         [Responsibilities to be defined]\n\n\
         ## 5. Compliance\n\n\
         Violations of this policy may result in disciplinary action.\n\n\
         ## 6. Review\n\n\
         This policy shall be reviewed annually.\n\n\
         ---\n\
         *Last Updated: {date}*\n\
         *Version: 1.0*\n"
    );
    GeneratedPolicy { title, content }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_known_template_fills_placeholders() {
        let policy = generate_policy("access_control", "Acme Corp", date());
        assert_eq!(policy.title, "Access Control Policy");
        assert!(policy.content.starts_with("# Access Control Policy"));
        assert!(policy.content.contains("Acme Corp"));
        assert!(policy.content.contains("2026-03-14"));
        assert!(!policy.content.contains("{company_name}"));
        assert!(!policy.content.contains("{date}"));
    }

    #[test]
    fn test_every_template_is_filled() {
        for template in TEMPLATES {
            let policy = generate_policy(template.policy_type, "Acme", date());
            assert_eq!(policy.title, template.title);
            assert!(!policy.content.contains('{'), "{} left a placeholder", template.policy_type);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(find_template("Encryption").is_some());
        assert!(find_template(" incident_response ").is_some());
    }

    #[test]
    fn test_unknown_type_gets_generic_skeleton() {
        let policy = generate_policy("physical_security", "Acme", date());
        assert_eq!(policy.title, "Physical Security Policy");
        assert!(policy.content.contains("guidelines for physical security at Acme"));
        for section in ["Purpose", "Scope", "Policy", "Responsibilities", "Compliance", "Review"] {
            assert!(policy.content.contains(section));
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("remote WORK"), "Remote Work");
        assert_eq!(title_case(""), "");
    }
}
