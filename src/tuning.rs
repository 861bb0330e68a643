/// Equal-tempered frequency for a signed semitone offset from a reference pitch.
pub fn semitone_freq(reference_hz: f64, semitone_offset: i32) -> f64 {
    reference_hz * 2.0_f64.powf(semitone_offset as f64 / 12.0)
}

/// Which key sounds which semitone offset.
#[derive(Debug, Clone)]
pub struct KeyMap {
    entries: Vec<(char, i32)>,
}

impl KeyMap {
    /// Default layout: a chromatic run over two keyboard rows, laid out like
    /// piano naturals on the home row with the accidentals above.
    pub fn chromatic() -> Self {
        let keys = [
            'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k', 'o', 'l', 'p',
        ];
        KeyMap {
            entries: keys.iter().enumerate().map(|(i, &k)| (k, i as i32)).collect(),
        }
    }

    pub fn from_entries(entries: Vec<(char, i32)>) -> Self {
        KeyMap { entries }
    }

    pub fn offset_of(&self, key: char) -> Option<i32> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, offset)| *offset)
    }

    pub fn contains(&self, key: char) -> bool {
        self.offset_of(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, i32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
