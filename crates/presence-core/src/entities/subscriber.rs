//! PBX subscriber record - one entry of the replicated PBX user table

/// Email entry of a subscriber
///
/// Some PBX entries store a bare username without a domain. Those only match
/// an address under the PBX's own system domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailEntry {
    pub email: String,
    pub domain_qualified: bool,
}

impl EmailEntry {
    /// Create an entry, deriving `domain_qualified` from the address itself
    pub fn new(email: impl Into<String>) -> Self {
        let email = email.into();
        let domain_qualified = email.contains('@');
        Self {
            email,
            domain_qualified,
        }
    }

    /// Check if this entry identifies `target` under the given system domain
    ///
    /// Matches either exactly, or (for bare usernames only) when
    /// `entry@system_domain` equals `target` and `target` lives in the
    /// system domain.
    pub fn matches(&self, system_domain: &str, target: &str) -> bool {
        if self.email.is_empty() || target.is_empty() {
            return false;
        }

        if self.email == target {
            return true;
        }

        if self.email.contains('@') {
            return false;
        }

        match target.split_once('@') {
            Some((local, domain)) => domain == system_domain && local == self.email,
            None => false,
        }
    }
}

/// Subscriber of the PBX directory, keyed by `guid`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberRecord {
    /// Stable unique key of the PBX object
    pub guid: String,
    /// Email entries in PBX order
    pub emails: Vec<EmailEntry>,
    /// Name of the PBX the subscriber is registered at
    pub location_id: String,
    /// H.323 name of the subscriber
    pub telephony_id: String,
}

impl SubscriberRecord {
    /// Create a new record
    pub fn new(
        guid: impl Into<String>,
        emails: Vec<EmailEntry>,
        location_id: impl Into<String>,
        telephony_id: impl Into<String>,
    ) -> Self {
        Self {
            guid: guid.into(),
            emails,
            location_id: location_id.into(),
            telephony_id: telephony_id.into(),
        }
    }

    /// Check if any email entry of this record identifies `target`
    pub fn matches_email(&self, system_domain: &str, target: &str) -> bool {
        self.emails
            .iter()
            .any(|entry| entry.matches(system_domain, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_qualified_flag() {
        assert!(EmailEntry::new("bob@example.com").domain_qualified);
        assert!(!EmailEntry::new("bob").domain_qualified);
    }

    #[test]
    fn test_exact_match() {
        let entry = EmailEntry::new("bob@example.com");
        assert!(entry.matches("example.com", "bob@example.com"));
        assert!(entry.matches("other.org", "bob@example.com"));
        assert!(!entry.matches("example.com", "alice@example.com"));
    }

    #[test]
    fn test_bare_username_uses_system_domain() {
        let entry = EmailEntry::new("bob");
        assert!(entry.matches("example.com", "bob@example.com"));
        assert!(!entry.matches("other.org", "bob@example.com"));
        assert!(!entry.matches("example.com", "bobby@example.com"));
    }

    #[test]
    fn test_qualified_entry_never_elides_domain() {
        let entry = EmailEntry::new("bob@other.com");
        assert!(!entry.matches("example.com", "bob@example.com"));
    }

    #[test]
    fn test_target_without_domain() {
        let entry = EmailEntry::new("bob");
        assert!(entry.matches("example.com", "bob"));
        assert!(!EmailEntry::new("alice").matches("example.com", "bob"));
    }

    #[test]
    fn test_empty_values_never_match() {
        assert!(!EmailEntry::new("").matches("example.com", ""));
        assert!(!EmailEntry::new("").matches("", "@"));
        assert!(!EmailEntry::new("bob").matches("example.com", ""));
    }

    #[test]
    fn test_record_matches_any_entry() {
        let record = SubscriberRecord::new(
            "g1",
            vec![
                EmailEntry::new("robert@other.com"),
                EmailEntry::new("bob"),
            ],
            "pbx1",
            "bob.h323",
        );
        assert!(record.matches_email("example.com", "bob@example.com"));
        assert!(record.matches_email("example.com", "robert@other.com"));
        assert!(!record.matches_email("example.com", "robert@example.com"));
    }
}
