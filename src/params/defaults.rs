//! Default param table, seeded once per boot with set-if-missing semantics.

/// Seeded via [`ParamStore::ensure_default`](super::ParamStore::ensure_default);
/// an operator- or runtime-set value is never overwritten.
pub const DEFAULT_PARAMS: &[(&str, &str)] = &[
    ("CompletedTrainingVersion", "0"),
    ("DisengageOnAccelerator", "0"),
    ("GsmMetered", "1"),
    ("HasAcceptedTerms", "0"),
    ("LanguageSetting", "main_en"),
    ("OpenpilotEnabledToggle", "1"),
];

/// Build metadata recorded unconditionally every boot, taken at compile time;
/// `"unknown"` when the build does not provide it.
pub const GIT_COMMIT: &str = match option_env!("GIT_COMMIT") {
    Some(v) => v,
    None => "unknown",
};

/// See [`GIT_COMMIT`].
pub const GIT_BRANCH: &str = match option_env!("GIT_BRANCH") {
    Some(v) => v,
    None => "unknown",
};

/// See [`GIT_COMMIT`].
pub const GIT_REMOTE: &str = match option_env!("GIT_REMOTE") {
    Some(v) => v,
    None => "unknown",
};

/// Version of the terms the user must have accepted.
pub const TERMS_VERSION: &str = "2";

/// Version of the onboarding training flow.
pub const TRAINING_VERSION: &str = "0.2.0";
