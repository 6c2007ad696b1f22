/// Payment channel of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Method {
    Cash,
    Bank,
}

impl Method {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "현금",
            Self::Bank => "은행",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "현금" | "cash" => Some(Self::Cash),
            "은행" | "bank" => Some(Self::Bank),
            _ => None,
        }
    }

    pub(crate) fn all() -> &'static [Method] {
        &[Self::Cash, Self::Bank]
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
