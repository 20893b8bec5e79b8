use std::fmt;

/// Parser extensions the engine can enable on top of plain JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Jsx,
    TypeScript,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Jsx, Dialect::TypeScript];

    fn bit(self) -> u8 {
        match self {
            Dialect::Jsx => 0b01,
            Dialect::TypeScript => 0b10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Jsx => "jsx",
            Dialect::TypeScript => "typescript",
        }
    }
}

/// Closed set of [`Dialect`] tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DialectSet(u8);

impl DialectSet {
    pub const fn empty() -> Self {
        DialectSet(0)
    }

    pub fn with(mut self, dialect: Dialect) -> Self {
        self.insert(dialect);
        self
    }

    pub fn insert(&mut self, dialect: Dialect) {
        self.0 |= dialect.bit();
    }

    pub fn contains(self, dialect: Dialect) -> bool {
        self.0 & dialect.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Dialect> {
        Dialect::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Dialect> for DialectSet {
    fn from_iter<I: IntoIterator<Item = Dialect>>(iter: I) -> Self {
        iter.into_iter()
            .fold(DialectSet::empty(), |set, dialect| set.with(dialect))
    }
}

impl fmt::Display for DialectSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Dialect::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
