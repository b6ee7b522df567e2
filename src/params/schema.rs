//! Compile-time schema: which lifecycle categories each param key carries.
//!
//! Tagging is fixed here, never chosen per-write. Keys absent from the table
//! carry no categories and are never bulk-cleared.

/// Lifecycle category of a param key, determining which bulk-clear event
/// removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Cleared every time the supervisor starts.
    ManagerStart,
    /// Cleared on the offroad→onroad edge.
    OnroadTransition,
    /// Cleared on the onroad→offroad edge.
    OffroadTransition,
    /// Cleared at startup on release-channel builds.
    DevelopmentOnly,
    /// Survives everything short of a full store wipe.
    Persistent,
}

/// Static key → category tagging.
const SCHEMA: &[(&str, &[Category])] = &[
    ("CarParams", &[Category::ManagerStart, Category::OnroadTransition]),
    ("ControlsReady", &[Category::ManagerStart, Category::OnroadTransition]),
    ("CurrentRoute", &[Category::OnroadTransition]),
    ("IsOnroad", &[Category::ManagerStart]),
    ("IsOffroad", &[Category::ManagerStart]),
    ("Offroad_ConnectivityNeeded", &[Category::OffroadTransition]),
    ("Offroad_TemperatureTooHigh", &[Category::OffroadTransition]),
    ("JoystickDebugMode", &[Category::DevelopmentOnly]),
    ("LongitudinalManeuverMode", &[Category::DevelopmentOnly]),
    ("CompletedTrainingVersion", &[Category::Persistent]),
    ("DongleId", &[Category::Persistent]),
    ("GsmMetered", &[Category::Persistent]),
    ("HardwareSerial", &[Category::Persistent]),
    ("HasAcceptedTerms", &[Category::Persistent]),
    ("LanguageSetting", &[Category::Persistent]),
];

/// Returns the categories of `key` (empty slice for untracked keys).
pub fn categories(key: &str) -> &'static [Category] {
    SCHEMA
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, cats)| *cats)
        .unwrap_or(&[])
}

/// Iterates over every key tagged with `category`.
pub fn keys_with(category: Category) -> impl Iterator<Item = &'static str> {
    SCHEMA
        .iter()
        .filter(move |(_, cats)| cats.contains(&category))
        .map(|(k, _)| *k)
}

/// True if `key` is tagged [`Category::Persistent`].
pub fn is_persistent(key: &str) -> bool {
    categories(key).contains(&Category::Persistent)
}
