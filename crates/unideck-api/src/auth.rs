/// The platform type of the UniFi controller.
///
/// Determines URL prefixes and the login, logout and self-probe paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPlatform {
    /// UniFi OS device (UDM, UCG, etc.) -- port 443, `/proxy/network/` prefix.
    UnifiOs,
    /// Standalone Network Application (Java) -- port 8443, no prefix.
    ClassicController,
}

impl ControllerPlatform {
    /// The path prefix for session API endpoints.
    pub fn legacy_prefix(&self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network",
            Self::ClassicController => "",
        }
    }

    /// The login endpoint path.
    pub fn login_path(&self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/login",
            Self::ClassicController => "/api/login",
        }
    }

    /// The logout endpoint path.
    pub fn logout_path(&self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/logout",
            Self::ClassicController => "/api/logout",
        }
    }

    /// The "who am I" endpoint used to check that a session is still valid.
    ///
    /// UniFi OS serves it outside the network application proxy.
    pub fn self_path(&self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/users/self",
            Self::ClassicController => "/api/self",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ControllerPlatform;

    #[test]
    fn classic_paths_have_no_prefix() {
        let p = ControllerPlatform::ClassicController;
        assert_eq!(p.legacy_prefix(), "");
        assert_eq!(p.login_path(), "/api/login");
        assert_eq!(p.self_path(), "/api/self");
    }

    #[test]
    fn unifi_os_paths() {
        let p = ControllerPlatform::UnifiOs;
        assert_eq!(p.legacy_prefix(), "/proxy/network");
        assert_eq!(p.login_path(), "/api/auth/login");
        assert_eq!(p.logout_path(), "/api/auth/logout");
        assert_eq!(p.self_path(), "/api/users/self");
    }
}
