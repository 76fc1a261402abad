//! The closed enumeration of error classes ("dsignals") the runtime can
//! raise. Every failure the core reports names exactly one of these.

use crate::sink::EventCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Dsignal {
    // --- specifier / path errors ---
    IllegalPath,
    IllegalFullname,
    IllegalSpecifier,

    // --- install errors ---
    InstallNameConflict,
    MissingDepMapping,
    InvalidDepMapping,
    DepGraphCycle,

    // --- import errors ---
    ImportModuleNotFound,
    ParcelNotFound,

    // --- compile errors ---
    CompileSyntaxError,
    CompileFileNotFound,

    // --- instantiate errors ---
    ItemNotFound,

    // --- verifier errors ---
    VerifRegisterOutOfBounds,
    VerifConstNotTypeConst,
    VerifConstWrongKind,
    VerifIllegalMemberName,
    VerifIllegalOwnerPrefix,
    VerifOwnerNotFound,
    VerifCallsigIndexOutOfBounds,
    VerifCallsigNotTypeConst,
    VerifEmptyBytecode,
    VerifPutsPcOutOfBounds,
    VerifJumpOutOfBounds,
    VerifMaxLocalsExceeded,
    VerifRegisterWrongType,
    VerifViolatesRegisterCoherence,
    VerifArgCountMismatch,
    VerifArgTypeMismatch,
    VerifReturnTypeMismatch,
    VerifConditionNotBool,
    VerifDeadCode,
}

impl Dsignal {
    /// The debug-sink category this dsignal is partitioned under (see
    /// the domain's debug-sink category design note).
    pub fn category(self) -> EventCategory {
        use Dsignal::*;
        match self {
            IllegalPath | IllegalFullname | IllegalSpecifier => EventCategory::Import,
            InstallNameConflict | MissingDepMapping | InvalidDepMapping | DepGraphCycle => {
                EventCategory::Install
            }
            ImportModuleNotFound | ParcelNotFound => EventCategory::Import,
            CompileSyntaxError | CompileFileNotFound => EventCategory::Compile,
            ItemNotFound => EventCategory::Instantiate,
            VerifRegisterOutOfBounds
            | VerifConstNotTypeConst
            | VerifConstWrongKind
            | VerifIllegalMemberName
            | VerifIllegalOwnerPrefix
            | VerifOwnerNotFound
            | VerifCallsigIndexOutOfBounds
            | VerifCallsigNotTypeConst
            | VerifEmptyBytecode
            | VerifPutsPcOutOfBounds
            | VerifJumpOutOfBounds
            | VerifMaxLocalsExceeded
            | VerifRegisterWrongType
            | VerifViolatesRegisterCoherence
            | VerifArgCountMismatch
            | VerifArgTypeMismatch
            | VerifReturnTypeMismatch
            | VerifConditionNotBool
            | VerifDeadCode => EventCategory::Verify,
        }
    }

    pub fn code(self) -> &'static str {
        use Dsignal::*;
        match self {
            IllegalPath => "illegal_path",
            IllegalFullname => "illegal_fullname",
            IllegalSpecifier => "illegal_specifier",
            InstallNameConflict => "install_install_name_conflict",
            MissingDepMapping => "install_missing_dep_mapping",
            InvalidDepMapping => "install_invalid_dep_mapping",
            DepGraphCycle => "install_dep_graph_cycle",
            ImportModuleNotFound => "import_module_not_found",
            ParcelNotFound => "import_parcel_not_found",
            CompileSyntaxError => "compile_syntax_error",
            CompileFileNotFound => "compile_file_not_found",
            ItemNotFound => "instantiate_item_not_found",
            VerifRegisterOutOfBounds => "verif_RA_out_of_bounds",
            VerifConstNotTypeConst => "verif_KtB_not_type_const",
            VerifConstWrongKind => "verif_const_wrong_kind",
            VerifIllegalMemberName => "verif_illegal_member_name",
            VerifIllegalOwnerPrefix => "verif_illegal_owner_prefix",
            VerifOwnerNotFound => "verif_owner_not_found",
            VerifCallsigIndexOutOfBounds => "verif_callsig_index_out_of_bounds",
            VerifCallsigNotTypeConst => "verif_callsig_not_type_const",
            VerifEmptyBytecode => "verif_empty_bytecode",
            VerifPutsPcOutOfBounds => "verif_puts_PC_out_of_bounds",
            VerifJumpOutOfBounds => "verif_jump_out_of_bounds",
            VerifMaxLocalsExceeded => "verif_max_locals_exceeded",
            VerifRegisterWrongType => "verif_RA_wrong_type",
            VerifViolatesRegisterCoherence => "verif_violates_register_coherence",
            VerifArgCountMismatch => "verif_arg_count_mismatch",
            VerifArgTypeMismatch => "verif_arg_type_mismatch",
            VerifReturnTypeMismatch => "verif_return_type_mismatch",
            VerifConditionNotBool => "verif_condition_not_bool",
            VerifDeadCode => "verif_dead_code",
        }
    }
}

impl std::fmt::Display for Dsignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
