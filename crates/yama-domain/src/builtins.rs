//! The `yama` parcel: the six primitive types. Installed automatically by
//! every [`Domain`](crate::Domain), under the install-name `yama`, before
//! any caller-supplied parcel. A module's own constant table may still only
//! reference `yama:*` if its owning parcel declares a dependency mapped to
//! the real install-name `yama` (see `real_dep_names` in `domain.rs`) — the
//! built-in parcel gets no special exemption from that rule. The `uploads`
//! parcel is the one exception wired at [`Domain::bootstrap`](crate::domain)
//! time, to keep ad hoc uploaded modules able to name primitive types.

use crate::services::ParcelServices;
use yama_install::Parcel;
use yama_instantiate::TypeId;
use yama_ir::{ConstTable, ModuleDescription, PrimitiveTag, TypeDescription, UnqualifiedName};

pub(crate) struct BuiltinParcel;

impl Parcel<ParcelServices> for BuiltinParcel {
    fn deps(&self) -> Vec<String> {
        Vec::new()
    }

    fn import(&self, _services: &ParcelServices, relative_path: &str) -> Option<ModuleDescription> {
        if !relative_path.is_empty() {
            return None;
        }
        let mut module = ModuleDescription::new();
        for (tag, name) in [
            (PrimitiveTag::None, "None"),
            (PrimitiveTag::Int, "Int"),
            (PrimitiveTag::Uint, "Uint"),
            (PrimitiveTag::Float, "Float"),
            (PrimitiveTag::Bool, "Bool"),
            (PrimitiveTag::Char, "Char"),
        ] {
            let name = UnqualifiedName::parse(name).expect("builtin tag is a valid ident");
            let desc = TypeDescription::new_primitive(name.clone(), ConstTable::new(), tag);
            assert!(module.insert(name, desc), "builtin names are pairwise distinct");
        }
        Some(module)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct BuiltinIds {
    pub(crate) none: TypeId,
    pub(crate) int: TypeId,
    pub(crate) uint: TypeId,
    pub(crate) float: TypeId,
    pub(crate) bool_: TypeId,
    pub(crate) char_: TypeId,
}
