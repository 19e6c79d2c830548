//! Conformance file vocabulary
//!
//! The directives, encoding symbols and option keywords understood by
//! asn2wrs, together with the text shown for them in completions and
//! hovers.

/// Directive kinds of the asn2wrs conformance dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    Import,
    Include,
    TypeRename,
    FieldRename,
    TfRename,
    EndOfCnf,
    Opt,
    Pdu,
    Register,
    Module,
    ModuleImport,
    OmitAssignment,
    NoOmitAssgn,
    VirtualAssgn,
    SetType,
    AssignValueToType,
    ImportTag,
    TypeAttr,
    EtypeAttr,
    FieldAttr,
    EfieldAttr,
    Syntax,
    OmitAllAssignments,
    OmitAssignmentsExcept,
    OmitAllTypeAssignments,
    OmitTypeAssignmentsExcept,
    OmitAllValueAssignments,
    OmitValueAssignmentsExcept,
    Exports,
    ModuleExports,
    UserDefined,
    NoEmit,
    MakeEnum,
    MakeDefines,
    UseValsExt,
    FnHdr,
    FnFtr,
    FnBody,
    FnPars,
    Class,
    AssignedObjectIdentifier,
    End,
}

impl Directive {
    /// Every directive, in catalog order
    pub const ALL: [Directive; 42] = [
        Self::Import,
        Self::Include,
        Self::TypeRename,
        Self::FieldRename,
        Self::TfRename,
        Self::EndOfCnf,
        Self::Opt,
        Self::Pdu,
        Self::Register,
        Self::Module,
        Self::ModuleImport,
        Self::OmitAssignment,
        Self::NoOmitAssgn,
        Self::VirtualAssgn,
        Self::SetType,
        Self::AssignValueToType,
        Self::ImportTag,
        Self::TypeAttr,
        Self::EtypeAttr,
        Self::FieldAttr,
        Self::EfieldAttr,
        Self::Syntax,
        Self::OmitAllAssignments,
        Self::OmitAssignmentsExcept,
        Self::OmitAllTypeAssignments,
        Self::OmitTypeAssignmentsExcept,
        Self::OmitAllValueAssignments,
        Self::OmitValueAssignmentsExcept,
        Self::Exports,
        Self::ModuleExports,
        Self::UserDefined,
        Self::NoEmit,
        Self::MakeEnum,
        Self::MakeDefines,
        Self::UseValsExt,
        Self::FnHdr,
        Self::FnFtr,
        Self::FnBody,
        Self::FnPars,
        Self::Class,
        Self::AssignedObjectIdentifier,
        Self::End,
    ];

    /// The literal label, e.g. `#.REGISTER`
    pub fn label(&self) -> &'static str {
        match self {
            Self::Import => "#.IMPORT",
            Self::Include => "#.INCLUDE",
            Self::TypeRename => "#.TYPE_RENAME",
            Self::FieldRename => "#.FIELD_RENAME",
            Self::TfRename => "#.TF_RENAME",
            Self::EndOfCnf => "#.END_OF_CNF",
            Self::Opt => "#.OPT",
            Self::Pdu => "#.PDU",
            Self::Register => "#.REGISTER",
            Self::Module => "#.MODULE",
            Self::ModuleImport => "#.MODULE_IMPORT",
            Self::OmitAssignment => "#.OMIT_ASSIGNMENT",
            Self::NoOmitAssgn => "#.NO_OMIT_ASSGN",
            Self::VirtualAssgn => "#.VIRTUAL_ASSGN",
            Self::SetType => "#.SET_TYPE",
            Self::AssignValueToType => "#.ASSIGN_VALUE_TO_TYPE",
            Self::ImportTag => "#.IMPORT_TAG",
            Self::TypeAttr => "#.TYPE_ATTR",
            Self::EtypeAttr => "#.ETYPE_ATTR",
            Self::FieldAttr => "#.FIELD_ATTR",
            Self::EfieldAttr => "#.EFIELD_ATTR",
            Self::Syntax => "#.SYNTAX",
            Self::OmitAllAssignments => "#.OMIT_ALL_ASSIGNMENTS",
            Self::OmitAssignmentsExcept => "#.OMIT_ASSIGNMENTS_EXCEPT",
            Self::OmitAllTypeAssignments => "#.OMIT_ALL_TYPE_ASSIGNMENTS",
            Self::OmitTypeAssignmentsExcept => "#.OMIT_TYPE_ASSIGNMENTS_EXCEPT",
            Self::OmitAllValueAssignments => "#.OMIT_ALL_VALUE_ASSIGNMENTS",
            Self::OmitValueAssignmentsExcept => "#.OMIT_VALUE_ASSIGNMENTS_EXCEPT",
            Self::Exports => "#.EXPORTS",
            Self::ModuleExports => "#.MODULE_EXPORTS",
            Self::UserDefined => "#.USER_DEFINED",
            Self::NoEmit => "#.NO_EMIT",
            Self::MakeEnum => "#.MAKE_ENUM",
            Self::MakeDefines => "#.MAKE_DEFINES",
            Self::UseValsExt => "#.USE_VALS_EXT",
            Self::FnHdr => "#.FN_HDR",
            Self::FnFtr => "#.FN_FTR",
            Self::FnBody => "#.FN_BODY",
            Self::FnPars => "#.FN_PARS",
            Self::Class => "#.CLASS",
            Self::AssignedObjectIdentifier => "#.ASSIGNED_OBJECT_IDENTIFIER",
            Self::End => "#.END",
        }
    }

    /// Look up a directive by its exact label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.label() == label)
    }

    /// One-line summary used as completion detail
    pub fn detail(&self) -> &'static str {
        match self {
            Self::Import | Self::Include => "Include/import another conformance (*.cnf) file.",
            Self::TypeRename => "Rename a type.",
            Self::FieldRename => "Rename a field.",
            Self::TfRename => "Rename a type or field.",
            Self::EndOfCnf => "End of the conformance file.",
            Self::Opt => "Set an asn2wrs compiler option.",
            Self::Pdu => "Declare a type as a PDU.",
            Self::Register => "Register a dissector for an object to an OID.",
            Self::Module => "Map an ASN.1 module to a protocol name.",
            Self::ModuleImport => "Map an imported ASN.1 module to a protocol.",
            Self::OmitAssignment => "Omit code generation for an assignment.",
            Self::NoOmitAssgn => "Force code generation for an omitted assignment.",
            Self::VirtualAssgn => "Create a virtual assignment for an anonymous type.",
            Self::SetType => "Override the type of a field.",
            Self::AssignValueToType => "Assign a value to a type.",
            Self::ImportTag => "Declare the tag of an imported type.",
            Self::TypeAttr => "Set header field attributes for a type.",
            Self::EtypeAttr => "Set header field attributes for an exported type.",
            Self::FieldAttr => "Set header field attributes for a field.",
            Self::EfieldAttr => "Set header field attributes for an exported field.",
            Self::Syntax => "Register a BER syntax for a type.",
            Self::OmitAllAssignments => "Omit code generation for all assignments.",
            Self::OmitAssignmentsExcept => "Omit all assignments except the listed ones.",
            Self::OmitAllTypeAssignments => "Omit code generation for all type assignments.",
            Self::OmitTypeAssignmentsExcept => "Omit all type assignments except the listed ones.",
            Self::OmitAllValueAssignments => "Omit code generation for all value assignments.",
            Self::OmitValueAssignmentsExcept => "Omit all value assignments except the listed ones.",
            Self::Exports => "Export types for use by other dissectors.",
            Self::ModuleExports => "Export all types of a module.",
            Self::UserDefined => "Declare user-defined dissector functions.",
            Self::NoEmit => "Suppress emitting code for listed types.",
            Self::MakeEnum => "Generate an enum for a type.",
            Self::MakeDefines => "Generate #define constants for a type.",
            Self::UseValsExt => "Use an extended value_string for a type.",
            Self::FnHdr => "Code inserted at the start of a dissector function.",
            Self::FnFtr => "Code inserted at the end of a dissector function.",
            Self::FnBody => "Replace the body of a dissector function.",
            Self::FnPars => "Override parameters of a dissector function.",
            Self::Class => "Define an information object class.",
            Self::AssignedObjectIdentifier => "Declare an assigned object identifier.",
            Self::End => "End of a directive block.",
        }
    }

    /// Markdown documentation shown on hover and completion resolve
    pub fn documentation(&self) -> &'static str {
        match self {
            Self::Register => {
                "`#.REGISTER` directive in the Asn2wrs conformation file can be used to register a \
                 dissector for an object to an OID. This is very useful for X.509 and similar \
                 protocols where structures and objects are frequently associated with an OID. In \
                 particular, some of the structures here encode an OID in a field and then the \
                 content in a different field later, and how that field is to be dissected depends \
                 on the previously seen OID.\n\n\
                 Entries:\n\n\
                 ```\n\
                 TypeName B|BER|P|PER|O|OER \"oid\" \"name\"\n\
                 TypeName N|NUM|S|STR table value \"name\"\n\
                 ```"
            }
            Self::Import => {
                "`#.IMPORT` directive in the Asn2wrs conformation file is used to import external \
                 type definitions from another file."
            }
            Self::Include => {
                "`#.INCLUDE` directive in the Asn2wrs conformation file is used to import external \
                 type definitions from another file."
            }
            Self::TypeRename => {
                "`#.TYPE_RENAME` directive in the Asn2wrs conformation file is used to rename a \
                 type.\n\nEntries: `OldName NewName`"
            }
            Self::FieldRename => {
                "`#.FIELD_RENAME` directive in the Asn2wrs conformation file is used to rename a \
                 field.\n\nEntries: `Type/field newName`"
            }
            Self::TfRename => {
                "`#.TF_RENAME` directive in the Asn2wrs conformation file is used to rename a type \
                 or field."
            }
            Self::End => {
                "`#.END` directive in the Asn2wrs conformation file is used to mark the end of a \
                 directive block. Its use is optional, as any other directive will also end the \
                 current block."
            }
            Self::EndOfCnf => {
                "`#.END_OF_CNF` directive in the Asn2wrs conformation file is used to mark the end \
                 of the conformance file. Its use is optional, and rarely used overall."
            }
            Self::Opt => {
                "`#.OPT` directive in the Asn2wrs conformation file is used to set compiler \
                 options: `-I`, `-b|BER|CER|DER`, `PER`, `OER`, `-p|PROTO`, `ALIGNED`, \
                 `-u|UNALIGNED`, `PROTO_ROOT_NAME`, `-d`, `-e`, `-S`, `GROUP_BY_PROT`, `-o`, `-O`, \
                 `-s`, `-k`, `-L`, `EMBEDDED_PDV_CB`, `EXTERNAL_TYPE_CB`, `-r`."
            }
            _ => self.detail(),
        }
    }

    /// Completion insert text; `${n:...}` placeholders need snippet support
    pub fn snippet(&self) -> Option<&'static str> {
        match self {
            Self::Import => Some("#.IMPORT ${1:filepath}"),
            Self::Include => Some("#.INCLUDE ${1:filepath}"),
            _ => None,
        }
    }
}

/// Encoding symbols allowed in `#.REGISTER` entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingType {
    N,
    Num,
    S,
    Str,
    B,
    Ber,
    P,
    Per,
    O,
    Oer,
}

impl EncodingType {
    /// All symbols, text encodings first
    pub const ALL: [EncodingType; 10] = [
        Self::N,
        Self::Num,
        Self::S,
        Self::Str,
        Self::B,
        Self::Ber,
        Self::P,
        Self::Per,
        Self::O,
        Self::Oer,
    ];

    /// ASN.1 binary encodings
    pub const BINARY: [EncodingType; 6] = [
        Self::B,
        Self::Ber,
        Self::P,
        Self::Per,
        Self::O,
        Self::Oer,
    ];

    /// Table-driven text encodings
    pub const TEXT: [EncodingType; 4] = [Self::N, Self::Num, Self::S, Self::Str];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::N => "N",
            Self::Num => "NUM",
            Self::S => "S",
            Self::Str => "STR",
            Self::B => "B",
            Self::Ber => "BER",
            Self::P => "P",
            Self::Per => "PER",
            Self::O => "O",
            Self::Oer => "OER",
        }
    }

    /// Case-sensitive exact lookup
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.symbol() == symbol)
    }

    /// The unabbreviated symbol (`BER` for both `B` and `BER`)
    pub fn long_name(&self) -> &'static str {
        match self {
            Self::N | Self::Num => "NUM",
            Self::S | Self::Str => "STR",
            Self::B | Self::Ber => "BER",
            Self::P | Self::Per => "PER",
            Self::O | Self::Oer => "OER",
        }
    }

    /// The one-letter abbreviation
    pub fn short_name(&self) -> &'static str {
        &self.long_name()[..1]
    }

    pub fn is_text(&self) -> bool {
        Self::TEXT.contains(self)
    }

    pub fn is_binary(&self) -> bool {
        Self::BINARY.contains(self)
    }

    pub fn detail(&self) -> String {
        format!(
            "Register an item using {} encoding (abbreviated as {}).",
            self.long_name(),
            self.short_name()
        )
    }

    pub fn documentation(&self) -> String {
        format!(
            "Encoding type {} (abbreviated as {})",
            self.long_name(),
            self.short_name()
        )
    }
}

/// Option keywords accepted after type names in several blocks
pub const OPTION_KEYWORDS: [&str; 9] = [
    "WITH_VALS",
    "WITHOUT_VALS",
    "ONLY_VALS",
    "ONLY_ENUM",
    "WITH_ENUM",
    "VALS_WITH_TABLE",
    "WS_DLL",
    "EXTERN",
    "NO_PROT_PREFIX",
];

/// One-line summary of an option keyword, if it is one
pub fn option_keyword_detail(keyword: &str) -> Option<&'static str> {
    let detail = match keyword {
        "WITH_VALS" => "Generate a value_string table for the type.",
        "WITHOUT_VALS" => "Do not generate a value_string table for the type.",
        "ONLY_VALS" => "Generate only the value_string table, no dissector.",
        "ONLY_ENUM" => "Generate only the enum, no value_string table.",
        "WITH_ENUM" => "Generate an enum alongside the value_string table.",
        "VALS_WITH_TABLE" => "Generate the value_string table with the dissector table.",
        "WS_DLL" => "Mark the generated symbol for export from the Wireshark library.",
        "EXTERN" => "Declare the generated symbol as extern.",
        "NO_PROT_PREFIX" => "Do not prefix generated names with the protocol name.",
        _ => return None,
    };
    Some(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels_round_trip() {
        for directive in Directive::ALL {
            assert_eq!(Directive::from_label(directive.label()), Some(directive));
            assert!(directive.label().starts_with("#."));
        }
        assert_eq!(Directive::from_label("#.register"), None);
        assert_eq!(Directive::from_label("#.NOPE"), None);
    }

    #[test]
    fn test_labels_are_unique() {
        let labels: HashSet<_> = Directive::ALL.iter().map(|d| d.label()).collect();
        assert_eq!(labels.len(), Directive::ALL.len());
    }

    #[test]
    fn test_encoding_families() {
        assert!(EncodingType::Num.is_text());
        assert!(!EncodingType::Num.is_binary());
        assert!(EncodingType::Ber.is_binary());
        for encoding in EncodingType::ALL {
            assert_ne!(encoding.is_text(), encoding.is_binary());
        }
    }

    #[test]
    fn test_encoding_symbols_are_case_sensitive() {
        assert_eq!(EncodingType::from_symbol("BER"), Some(EncodingType::Ber));
        assert_eq!(EncodingType::from_symbol("ber"), None);
        assert_eq!(EncodingType::from_symbol("INVALID"), None);
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!(EncodingType::S.long_name(), "STR");
        assert_eq!(EncodingType::Oer.short_name(), "O");
        assert_eq!(
            EncodingType::B.detail(),
            "Register an item using BER encoding (abbreviated as B)."
        );
    }

    #[test]
    fn test_every_option_keyword_has_detail() {
        for keyword in OPTION_KEYWORDS {
            assert!(option_keyword_detail(keyword).is_some(), "{}", keyword);
        }
        assert_eq!(option_keyword_detail("#.REGISTER"), None);
    }

    #[test]
    fn test_snippets() {
        assert_eq!(Directive::Import.snippet(), Some("#.IMPORT ${1:filepath}"));
        assert_eq!(Directive::Register.snippet(), None);
    }
}
