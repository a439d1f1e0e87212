/// The `http://www.w3.org/2001/XMLSchema` namespace URI.
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Xs {
    AnyType,
    AnySimpleType,
    Untyped,
    AnyAtomicType,
    Numeric,
    String,
    UntypedAtomic,
    Boolean,
    Decimal,
    NonPositiveInteger,
    NegativeInteger,
    NonNegativeInteger,
    PositiveInteger,
    Integer,
    Long,
    Int,
    Short,
    Byte,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    Float,
    Double,
    QName,
    Notation,
    Duration,
    YearMonthDuration,
    DayTimeDuration,
    Time,
    GYearMonth,
    GYear,
    GMonthDay,
    GMonth,
    GDay,
    Base64Binary,
    HexBinary,
    AnyURI,
    DateTime,
    DateTimeStamp,
    Date,
    NormalizedString,
    Token,
    Language,
    NMTOKEN,
    Name,
    NCName,
    ID,
    IDREF,
    ENTITY,
}

impl Xs {
    pub fn by_name(namespace: Option<&str>, local_name: &str) -> Option<Self> {
        if namespace == Some(XS_NAMESPACE) {
            Xs::by_local_name(local_name)
        } else {
            None
        }
    }

    pub fn by_local_name(local_name: &str) -> Option<Self> {
        use Xs::*;
        let xs = match local_name {
            "anyType" => AnyType,
            "anySimpleType" => AnySimpleType,
            "untyped" => Untyped,
            "anyAtomicType" => AnyAtomicType,
            "numeric" => Numeric,
            "string" => String,
            "untypedAtomic" => UntypedAtomic,
            "boolean" => Boolean,
            "decimal" => Decimal,
            "nonPositiveInteger" => NonPositiveInteger,
            "negativeInteger" => NegativeInteger,
            "nonNegativeInteger" => NonNegativeInteger,
            "positiveInteger" => PositiveInteger,
            "integer" => Integer,
            "long" => Long,
            "int" => Int,
            "short" => Short,
            "byte" => Byte,
            "unsignedLong" => UnsignedLong,
            "unsignedInt" => UnsignedInt,
            "unsignedShort" => UnsignedShort,
            "unsignedByte" => UnsignedByte,
            "float" => Float,
            "double" => Double,
            "QName" => QName,
            "NOTATION" => Notation,
            "duration" => Duration,
            "yearMonthDuration" => YearMonthDuration,
            "dayTimeDuration" => DayTimeDuration,
            "time" => Time,
            "gYearMonth" => GYearMonth,
            "gYear" => GYear,
            "gMonthDay" => GMonthDay,
            "gMonth" => GMonth,
            "gDay" => GDay,
            "base64Binary" => Base64Binary,
            "hexBinary" => HexBinary,
            "anyURI" => AnyURI,
            "dateTime" => DateTime,
            "dateTimeStamp" => DateTimeStamp,
            "date" => Date,
            "normalizedString" => NormalizedString,
            "token" => Token,
            "language" => Language,
            "NMTOKEN" => NMTOKEN,
            "Name" => Name,
            "NCName" => NCName,
            "ID" => ID,
            "IDREF" => IDREF,
            "ENTITY" => ENTITY,
            _ => return None,
        };
        Some(xs)
    }

    pub fn namespace() -> &'static str {
        XS_NAMESPACE
    }

    pub fn local_name(&self) -> &str {
        use Xs::*;
        match self {
            AnyType => "anyType",
            AnySimpleType => "anySimpleType",
            Untyped => "untyped",
            AnyAtomicType => "anyAtomicType",
            Numeric => "numeric",
            String => "string",
            UntypedAtomic => "untypedAtomic",
            Boolean => "boolean",
            Decimal => "decimal",
            NonPositiveInteger => "nonPositiveInteger",
            NegativeInteger => "negativeInteger",
            NonNegativeInteger => "nonNegativeInteger",
            PositiveInteger => "positiveInteger",
            Integer => "integer",
            Long => "long",
            Int => "int",
            Short => "short",
            Byte => "byte",
            UnsignedLong => "unsignedLong",
            UnsignedInt => "unsignedInt",
            UnsignedShort => "unsignedShort",
            UnsignedByte => "unsignedByte",
            Float => "float",
            Double => "double",
            QName => "QName",
            Notation => "NOTATION",
            Duration => "duration",
            YearMonthDuration => "yearMonthDuration",
            DayTimeDuration => "dayTimeDuration",
            Time => "time",
            GYearMonth => "gYearMonth",
            GYear => "gYear",
            GMonthDay => "gMonthDay",
            GMonth => "gMonth",
            GDay => "gDay",
            Base64Binary => "base64Binary",
            HexBinary => "hexBinary",
            AnyURI => "anyURI",
            DateTime => "dateTime",
            DateTimeStamp => "dateTimeStamp",
            Date => "date",
            NormalizedString => "normalizedString",
            Token => "token",
            Language => "language",
            NMTOKEN => "NMTOKEN",
            Name => "Name",
            NCName => "NCName",
            ID => "ID",
            IDREF => "IDREF",
            ENTITY => "ENTITY",
        }
    }

    pub fn parent(&self) -> Option<Xs> {
        use Xs::*;
        match self {
            AnyType => None,
            AnySimpleType => Some(AnyType),
            Untyped => Some(AnyType),
            AnyAtomicType => Some(AnySimpleType),
            UntypedAtomic => Some(AnyAtomicType),
            Numeric => Some(AnySimpleType),
            String => Some(AnyAtomicType),
            Boolean => Some(AnyAtomicType),
            Float => Some(AnyAtomicType),
            Double => Some(AnyAtomicType),
            Decimal => Some(AnyAtomicType),
            Integer => Some(Decimal),
            NonPositiveInteger => Some(Integer),
            NegativeInteger => Some(NonPositiveInteger),
            Long => Some(Integer),
            Int => Some(Long),
            Short => Some(Int),
            Byte => Some(Short),
            NonNegativeInteger => Some(Integer),
            PositiveInteger => Some(NonNegativeInteger),
            UnsignedLong => Some(NonNegativeInteger),
            UnsignedInt => Some(UnsignedLong),
            UnsignedShort => Some(UnsignedInt),
            UnsignedByte => Some(UnsignedShort),
            QName => Some(AnyAtomicType),
            Notation => Some(AnyAtomicType),
            Duration => Some(AnyAtomicType),
            YearMonthDuration => Some(Duration),
            DayTimeDuration => Some(Duration),
            Time => Some(AnyAtomicType),
            GYearMonth => Some(AnyAtomicType),
            GYear => Some(AnyAtomicType),
            GMonthDay => Some(AnyAtomicType),
            GMonth => Some(AnyAtomicType),
            GDay => Some(AnyAtomicType),
            Base64Binary => Some(AnyAtomicType),
            HexBinary => Some(AnyAtomicType),
            AnyURI => Some(AnyAtomicType),
            DateTime => Some(AnyAtomicType),
            DateTimeStamp => Some(DateTime),
            Date => Some(AnyAtomicType),
            NormalizedString => Some(String),
            Token => Some(NormalizedString),
            Language => Some(Token),
            NMTOKEN => Some(Token),
            Name => Some(Token),
            NCName => Some(Name),
            ID => Some(NCName),
            IDREF => Some(NCName),
            ENTITY => Some(NCName),
        }
    }

    pub fn derives_from(&self, other: Xs) -> bool {
        if self == &other {
            return true;
        }
        match self.parent() {
            Some(parent_type) => parent_type.derives_from(other),
            None => false,
        }
    }

    pub fn matches(&self, other: Xs) -> bool {
        if other != Xs::Numeric {
            return self == &other;
        }
        self.derives_from(Xs::Double)
            || self.derives_from(Xs::Float)
            || self.derives_from(Xs::Decimal)
    }

    /// The inclusive-exclusive value range `[lo, hi)` of a bounded integer
    /// subtype, as `(lo, hi)` in `i128`. `None` for types with no declared
    /// bound (`integer`, `nonNegativeInteger`, ...).
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        use Xs::*;
        match self {
            Long => Some((-(1i128 << 63), 1i128 << 63)),
            Int => Some((-(1i128 << 31), 1i128 << 31)),
            Short => Some((-(1i128 << 15), 1i128 << 15)),
            Byte => Some((-(1i128 << 7), 1i128 << 7)),
            UnsignedLong => Some((0, 1i128 << 64)),
            UnsignedInt => Some((0, 1i128 << 32)),
            UnsignedShort => Some((0, 1i128 << 16)),
            UnsignedByte => Some((0, 1i128 << 8)),
            NonNegativeInteger => Some((0, i128::MAX)),
            PositiveInteger => Some((1, i128::MAX)),
            NonPositiveInteger => Some((i128::MIN, 1)),
            NegativeInteger => Some((i128::MIN, 0)),
            _ => None,
        }
    }

    /// True if this type is one of the bounded or constrained integer
    /// subtypes that `integer_range` describes.
    pub fn is_bounded_integer(&self) -> bool {
        self.integer_range().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derives_from() {
        assert!(Xs::Integer.derives_from(Xs::Integer));
        assert!(Xs::Integer.derives_from(Xs::Decimal));
        assert!(Xs::Integer.derives_from(Xs::AnyAtomicType));
        assert!(Xs::Integer.derives_from(Xs::AnySimpleType));
        assert!(Xs::Integer.derives_from(Xs::AnyType));
        assert!(Xs::Byte.derives_from(Xs::AnyAtomicType));
    }
}
