use std::fmt;

/// Member permission scopes requested during authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    BasicProfile,
    FullProfile,
    EmailAddress,
    Network,
    ContactInfo,
    NetworkUpdates,
    Groups,
    Messages,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::BasicProfile,
        Permission::FullProfile,
        Permission::EmailAddress,
        Permission::Network,
        Permission::ContactInfo,
        Permission::NetworkUpdates,
        Permission::Groups,
        Permission::Messages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::BasicProfile => "r_basicprofile",
            Permission::FullProfile => "r_fullprofile",
            Permission::EmailAddress => "r_emailaddress",
            Permission::Network => "r_network",
            Permission::ContactInfo => "r_contactinfo",
            Permission::NetworkUpdates => "rw_nus",
            Permission::Groups => "rw_groups",
            Permission::Messages => "w_messages",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Space-joined scope string as sent in the `scope` parameter.
pub(crate) fn scope_string(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
