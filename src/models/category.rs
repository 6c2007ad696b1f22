use std::fmt::Debug;
use std::hash::Hash;

/// Bucket label for rows whose category is blank or not in the vocabulary.
pub(crate) const UNSPECIFIED_LABEL: &str = "(미지정)";

/// The two parallel books the organization keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum LedgerKind {
    Income,
    Expense,
}

impl LedgerKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "수입",
            Self::Expense => "지출",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "i" | "수입" => Some(Self::Income),
            "expense" | "e" | "지출" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Table holding this ledger's rows.
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub(crate) fn columns(&self) -> &'static ColumnSpec {
        match self {
            Self::Income => &INCOME_COLUMNS,
            Self::Expense => &EXPENSE_COLUMNS,
        }
    }

    /// Label of the month-pivot row that leaves out carry-over categories.
    pub(crate) fn net_label(&self) -> &'static str {
        match self {
            Self::Income => "순입금액",
            Self::Expense => "순지출금액",
        }
    }
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column labels of one ledger's grid. The same labels head CSV imports and
/// exported sheets.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ColumnSpec {
    pub(crate) date: &'static str,
    pub(crate) method: &'static str,
    pub(crate) category: &'static str,
    pub(crate) description: &'static str,
    pub(crate) amount: &'static str,
    pub(crate) note: &'static str,
}

impl ColumnSpec {
    pub(crate) fn labels(&self) -> [&'static str; 6] {
        [
            self.date,
            self.method,
            self.category,
            self.description,
            self.amount,
            self.note,
        ]
    }
}

pub(crate) const INCOME_COLUMNS: ColumnSpec = ColumnSpec {
    date: "날짜",
    method: "적요",
    category: "수입항목",
    description: "수입내역",
    amount: "금액",
    note: "비고",
};

pub(crate) const EXPENSE_COLUMNS: ColumnSpec = ColumnSpec {
    date: "날짜",
    method: "적요",
    category: "지출항목",
    description: "지출내역",
    amount: "금액",
    note: "비고",
};

/// A closed category vocabulary belonging to one ledger kind.
pub(crate) trait Item: Copy + Eq + Hash + Debug + 'static {
    const KIND: LedgerKind;

    /// Every category, in display order.
    fn all() -> &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Exact label match after trimming.
    fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::all().iter().copied().find(|i| i.as_str() == trimmed)
    }
}

macro_rules! ledger_items {
    ($(#[$meta:meta])* $name:ident, $kind:expr, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub(crate) enum $name {
            $($variant),+
        }

        impl Item for $name {
            const KIND: LedgerKind = $kind;

            fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

ledger_items!(
    /// Offering and receipt lines of the income book.
    IncomeItem,
    LedgerKind::Income,
    {
        Tithe => "십일조",
        WeeklyOffering => "주정헌금",
        ThanksOffering => "감사헌금",
        MissionOffering => "선교헌금",
        BuildingOffering => "건축헌금",
        VehicleOffering => "차량헌금",
        ReliefOffering => "구제헌금",
        NewYearThanks => "신년감사헌금",
        EasterThanks => "부활절감사헌금",
        FirstfruitsThanks => "맥추감사헌금",
        HarvestThanks => "추수감사헌금",
        ChristmasThanks => "성탄감사헌금",
        PledgeOffering => "작정헌금",
        Other => "기타",
        Loan => "대출금",
        Deposit => "예치금",
        CarryForward => "이월금",
    }
);

ledger_items!(
    /// Department and bill lines of the expense book.
    ExpenseItem,
    LedgerKind::Expense,
    {
        Finance => "재정부",
        Worship => "예배부",
        Mission => "선교부",
        Care => "사량부",
        Facilities => "관리부",
        Kitchen => "식당봉사부",
        Evangelism => "새신자전도부",
        SundaySchool => "주일학교",
        Youth => "중고청년",
        StipendOne => "사례비1",
        StipendTwo => "사례비2",
        Electricity => "전기요금",
        Telephone => "전화요금등",
        Water => "상하수도요금",
        Parsonage => "사택관리",
        LoanInterest => "대출금이자",
        FireInsurance => "화재보험료",
        LoanRepayment => "대출금",
        Deposit => "예치금",
        CarryForward => "이월금",
    }
);
