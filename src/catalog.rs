use rand::Rng;
use rand::seq::IndexedRandom;

pub const OPERATION_TEMPLATES: &[&str] = &[
    "Reconnaissance Mission",
    "Equipment Maintenance",
    "Training Session",
    "Supply Transport",
    "System Diagnostics",
    "Communication Setup",
    "Defensive Positioning",
    "Patrol Route",
    "Equipment Testing",
    "Briefing Session",
    "Data Analysis",
    "Repair Operations",
    "Sensor Calibration",
    "Weapon Systems Check",
    "Shield Testing",
    "Navigation Planning",
    "Tactical Review",
    "Personnel Assignment",
    "Resource Allocation",
    "Status Reporting",
    "Emergency Drill",
    "Intelligence Gathering",
    "Security Patrol",
    "System Integration",
    "Performance Evaluation",
    "Mission Debriefing",
    "Protocol Training",
    "Equipment Upgrade",
    "Inspection Round",
    "Coordination Meeting",
];

pub const OPERATION_PREFIXES: &[&str] = &[
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Primary", "Secondary",
    "Advanced", "Basic", "Critical", "Routine", "Emergency", "Scheduled", "Priority", "Standard",
    "Special", "Tactical",
];

pub const NETWORK_NAMES: &[&str] = &[
    "Reconnaissance Phase",
    "Preparation Phase",
    "Execution Phase",
    "Support Operations",
    "Logistics Phase",
    "Defense Operations",
    "Training Phase",
    "Maintenance Cycle",
    "Development Phase",
    "Intelligence Operations",
    "Tactical Phase",
    "Strategic Planning",
];

pub const ROLES: &[&str] = &[
    "Lead Technician",
    "Support Crew",
    "Pilot",
    "Coordinator",
    "Analyst",
    "Specialist",
    "Operator",
    "Commander",
    "Assistant",
    "Chief Engineer",
    "Tactical Officer",
    "Communications Officer",
];

/// Static name pools used to label generated records.
///
/// Every pool is non-empty, so the pick helpers never come back empty-handed.
pub struct NameCatalogs;

impl NameCatalogs {
    pub fn operation_name<R: Rng + ?Sized>(rng: &mut R) -> String {
        format!(
            "{} {}",
            pick(OPERATION_PREFIXES, rng),
            pick(OPERATION_TEMPLATES, rng)
        )
    }

    pub fn network_name<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
        pick(NETWORK_NAMES, rng)
    }

    pub fn role<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
        pick(ROLES, rng)
    }
}

fn pick<R: Rng + ?Sized>(pool: &'static [&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}
