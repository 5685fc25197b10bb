use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "Swift", "Silent", "Brave", "Lucky", "Mellow", "Rapid", "Bold", "Calm",
];

const NOUNS: &[&str] = &[
    "Falcon", "Otter", "Badger", "Raven", "Lynx", "Heron", "Marten", "Fox",
];

/// Default display name for users who never opened the settings dialog.
pub fn random_display_name() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    let number: u16 = rng.random_range(0..1000);
    format!("{adjective}{noun}{number}")
}
