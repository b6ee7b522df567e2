//! Device identity gate, resolved once at startup.
//!
//! Registration is the one unconditional startup gate: a hard failure aborts
//! the supervisor before any worker is started. The sentinel
//! [`DongleId::UNREGISTERED`] is *not* a failure — it is a gating input that
//! disables upload-dependent workers while the rest of the fleet runs.
//!
//! Issuance policy (network retries, key exchange) belongs to the registrar
//! implementation, not to the supervisor.

use crate::error::RegistrationError;
use crate::params::ParamStore;

/// Stable device identity string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DongleId(String);

impl DongleId {
    /// Sentinel identity for devices that could reach the registrar but have
    /// no issued identity. Gating input, not an error.
    pub const UNREGISTERED: &'static str = "UnregisteredDevice";

    /// Wraps a raw identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The sentinel unregistered identity.
    pub fn unregistered() -> Self {
        Self(Self::UNREGISTERED.to_string())
    }

    /// False for the unregistered sentinel.
    pub fn is_registered(&self) -> bool {
        self.0 != Self::UNREGISTERED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DongleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the device identity.
///
/// # Errors
/// A hard failure (no identity and none issuable) is fatal to startup;
/// the sentinel unregistered identity is returned as `Ok`.
pub trait Registrar: Send + Sync {
    fn register(&self) -> Result<DongleId, RegistrationError>;
}

/// Registrar backed by the param store: returns the previously issued
/// `DongleId`, or fails hard when none was ever issued.
pub struct ParamRegistrar {
    params: ParamStore,
}

impl ParamRegistrar {
    pub fn new(params: ParamStore) -> Self {
        Self { params }
    }
}

impl Registrar for ParamRegistrar {
    fn register(&self) -> Result<DongleId, RegistrationError> {
        match self.params.get("DongleId") {
            Some(id) if !id.is_empty() => Ok(DongleId::new(id)),
            _ => Err(RegistrationError::Unavailable {
                serial: self.params.get("HardwareSerial").unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_ok_but_not_registered() {
        let id = DongleId::unregistered();
        assert!(!id.is_registered());
        assert_eq!(id.as_str(), DongleId::UNREGISTERED);
        assert!(DongleId::new("abc123").is_registered());
    }

    #[test]
    fn param_registrar_fails_hard_without_identity() {
        let dir = tempfile::tempdir().unwrap();
        let params = ParamStore::open(dir.path()).unwrap();
        params.put("HardwareSerial", "serial-42").unwrap();

        let reg = ParamRegistrar::new(params.clone());
        let err = reg.register().unwrap_err();
        assert!(matches!(err, RegistrationError::Unavailable { ref serial } if serial == "serial-42"));

        params.put("DongleId", "abc123").unwrap();
        assert_eq!(reg.register().unwrap(), DongleId::new("abc123"));
    }
}
