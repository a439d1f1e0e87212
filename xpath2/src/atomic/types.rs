use xpath2_schema_type::Xs;

/// The bounded and unbounded xs:integer subtypes, tagging an [`ibig::IBig`]
/// payload with which member of the integer lattice it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerType {
    Integer,
    NonPositiveInteger,
    NegativeInteger,
    NonNegativeInteger,
    PositiveInteger,
    Long,
    Int,
    Short,
    Byte,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
}

impl IntegerType {
    pub fn schema_type(&self) -> Xs {
        match self {
            IntegerType::Integer => Xs::Integer,
            IntegerType::Long => Xs::Long,
            IntegerType::Int => Xs::Int,
            IntegerType::Short => Xs::Short,
            IntegerType::Byte => Xs::Byte,
            IntegerType::UnsignedLong => Xs::UnsignedLong,
            IntegerType::UnsignedInt => Xs::UnsignedInt,
            IntegerType::UnsignedShort => Xs::UnsignedShort,
            IntegerType::UnsignedByte => Xs::UnsignedByte,
            IntegerType::NonPositiveInteger => Xs::NonPositiveInteger,
            IntegerType::NegativeInteger => Xs::NegativeInteger,
            IntegerType::NonNegativeInteger => Xs::NonNegativeInteger,
            IntegerType::PositiveInteger => Xs::PositiveInteger,
        }
    }

    pub fn from_schema_type(xs: Xs) -> Option<Self> {
        Some(match xs {
            Xs::Integer => IntegerType::Integer,
            Xs::Long => IntegerType::Long,
            Xs::Int => IntegerType::Int,
            Xs::Short => IntegerType::Short,
            Xs::Byte => IntegerType::Byte,
            Xs::UnsignedLong => IntegerType::UnsignedLong,
            Xs::UnsignedInt => IntegerType::UnsignedInt,
            Xs::UnsignedShort => IntegerType::UnsignedShort,
            Xs::UnsignedByte => IntegerType::UnsignedByte,
            Xs::NonPositiveInteger => IntegerType::NonPositiveInteger,
            Xs::NegativeInteger => IntegerType::NegativeInteger,
            Xs::NonNegativeInteger => IntegerType::NonNegativeInteger,
            Xs::PositiveInteger => IntegerType::PositiveInteger,
            _ => return None,
        })
    }
}

/// The xs:string subtypes supported as atomic values.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringType {
    String,
    NormalizedString,
    Token,
    Language,
    NMTOKEN,
    Name,
    NCName,
    ID,
    IDREF,
    ENTITY,
    AnyURI,
}

impl StringType {
    pub fn schema_type(&self) -> Xs {
        match self {
            StringType::String => Xs::String,
            StringType::NormalizedString => Xs::NormalizedString,
            StringType::Token => Xs::Token,
            StringType::Language => Xs::Language,
            StringType::NMTOKEN => Xs::NMTOKEN,
            StringType::Name => Xs::Name,
            StringType::NCName => Xs::NCName,
            StringType::ID => Xs::ID,
            StringType::IDREF => Xs::IDREF,
            StringType::ENTITY => Xs::ENTITY,
            StringType::AnyURI => Xs::AnyURI,
        }
    }

    pub fn from_schema_type(xs: Xs) -> Option<Self> {
        Some(match xs {
            Xs::String => StringType::String,
            Xs::NormalizedString => StringType::NormalizedString,
            Xs::Token => StringType::Token,
            Xs::Language => StringType::Language,
            Xs::NMTOKEN => StringType::NMTOKEN,
            Xs::Name => StringType::Name,
            Xs::NCName => StringType::NCName,
            Xs::ID => StringType::ID,
            Xs::IDREF => StringType::IDREF,
            Xs::ENTITY => StringType::ENTITY,
            Xs::AnyURI => StringType::AnyURI,
            _ => return None,
        })
    }
}

/// The binary encodings supported as atomic values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryType {
    Base64,
    Hex,
}

impl BinaryType {
    pub fn schema_type(&self) -> Xs {
        match self {
            BinaryType::Base64 => Xs::Base64Binary,
            BinaryType::Hex => Xs::HexBinary,
        }
    }
}
