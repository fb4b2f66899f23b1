//! Descriptive metadata extracted from a record file.

/// The closed Dublin Core element vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DcField {
    Title,
    Creator,
    Subject,
    Description,
    Publisher,
    Contributor,
    Date,
    Type,
    Format,
    Identifier,
    Source,
    Language,
    Relation,
    Coverage,
    Rights,
}

impl DcField {
    /// Every field, in vocabulary order.
    pub const ALL: [DcField; 15] = [
        DcField::Title,
        DcField::Creator,
        DcField::Subject,
        DcField::Description,
        DcField::Publisher,
        DcField::Contributor,
        DcField::Date,
        DcField::Type,
        DcField::Format,
        DcField::Identifier,
        DcField::Source,
        DcField::Language,
        DcField::Relation,
        DcField::Coverage,
        DcField::Rights,
    ];

    /// Look up an element's local name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Element name as it appears in the record.
    pub fn name(&self) -> &'static str {
        match self {
            DcField::Title => "title",
            DcField::Creator => "creator",
            DcField::Subject => "subject",
            DcField::Description => "description",
            DcField::Publisher => "publisher",
            DcField::Contributor => "contributor",
            DcField::Date => "date",
            DcField::Type => "type",
            DcField::Format => "format",
            DcField::Identifier => "identifier",
            DcField::Source => "source",
            DcField::Language => "language",
            DcField::Relation => "relation",
            DcField::Coverage => "coverage",
            DcField::Rights => "rights",
        }
    }

    /// Search index column the field is written to.
    pub fn column(&self) -> &'static str {
        match self {
            DcField::Title => "title_keyword",
            DcField::Creator => "creator_keyword",
            DcField::Subject => "subject_keyword",
            DcField::Description => "description_keyword",
            DcField::Publisher => "publisher_keyword",
            DcField::Contributor => "contributor_keyword",
            DcField::Date => "date_keyword",
            DcField::Type => "type_keyword",
            DcField::Format => "format_keyword",
            DcField::Identifier => "identifier_keyword",
            DcField::Source => "source_keyword",
            DcField::Language => "language_keyword",
            DcField::Relation => "relation_keyword",
            DcField::Coverage => "coverage_keyword",
            DcField::Rights => "rights_keyword",
        }
    }
}

/// One metadata element, in record order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub field: DcField,
    pub value: String,
}

impl FieldEntry {
    pub fn new(field: DcField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Identifier and fields of a parsed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    /// Raw identifier, before escaping
    pub identifier: String,
    pub fields: Vec<FieldEntry>,
}
