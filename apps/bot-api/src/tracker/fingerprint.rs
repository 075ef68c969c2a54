//! Change detection over snapshots.

use sha2::{Digest, Sha256};

use super::snapshot::Snapshot;

/// Stable digest of the notification-relevant parts of a snapshot: every
/// category's items in order, plus the weather condition text.
///
/// Weather icon and crop bonus text are cosmetic and excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(snapshot: &Snapshot) -> Self {
        let mut hasher = Sha256::new();
        for (category, items) in snapshot.categories() {
            write_field(&mut hasher, category.key().as_bytes());
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                write_field(&mut hasher, item.name.as_bytes());
                hasher.update(item.quantity.to_le_bytes());
            }
        }
        write_field(&mut hasher, snapshot.weather().condition.as_bytes());

        let digest = hasher.finalize();
        Self(digest.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Length-prefixed so adjacent fields can never run together.
fn write_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// What a session last told its user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LastNotified {
    /// Nothing has been sent yet.
    #[default]
    Nothing,
    /// The last message was the "no items matched your filter" notice for
    /// this snapshot.
    NoMatchNotice(Fingerprint),
    /// The last message was an update for this snapshot.
    Update(Fingerprint),
}

impl LastNotified {
    /// `false` only when `fingerprint` is the snapshot last notified about,
    /// whether by an update or by a no-match notice.
    pub fn has_changed(&self, fingerprint: &Fingerprint) -> bool {
        match self {
            LastNotified::Nothing => true,
            LastNotified::NoMatchNotice(last) | LastNotified::Update(last) => last != fingerprint,
        }
    }
}
