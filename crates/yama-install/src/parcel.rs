use yama_ir::ModuleDescription;

/// An externally supplied producer of module descriptions. Installed under
/// an install-name the parcel itself never knows.
///
/// `S` is the services capability object a parcel is handed back to reach
/// into the owning domain (`import` only — parcels may not install or
/// upload). Generic rather than depending directly on the domain crate,
/// since the domain depends on this crate, not the other way around.
pub trait Parcel<S> {
    /// The dependency identifier names this parcel declares as imports.
    fn deps(&self) -> Vec<String>;

    /// Produces the module description at `relative_path` (root path `""`
    /// allowed), or `None` if nothing lives there.
    fn import(&self, services: &S, relative_path: &str) -> Option<ModuleDescription>;
}
