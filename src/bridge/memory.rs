//! bridge::memory
//!
//! In-memory implementation of the foreign object model.
//!
//! # Design
//!
//! Every binding trait has an in-memory counterpart here so that the locator,
//! harvester and pipeline can be driven deterministically without a live
//! game process. Objects are assembled with builder methods; collections can
//! be built in each shape the collection adapter has to cope with:
//!
//! - [`MemoryObject::list`]: supports generic iteration
//! - [`MemoryObject::indexed`]: exposes only `Count` and `get_Item`
//! - [`MemoryObject::dictionary`]: dictionary entries
//! - [`MemoryObject::pairs`]: list of `Key`/`Value` pair objects
//!
//! Members and methods can be marked as faulting to exercise error paths.
//!
//! # Example
//!
//! ```
//! use tou_stats_exporter::bridge::memory::{MemoryModule, MemoryObject, MemoryRuntime, MemoryType};
//! use tou_stats_exporter::bridge::ForeignRuntime;
//!
//! let history = MemoryType::new("TownOfUs.Modules.GameHistory")
//!     .with_static("WinningFaction", "Crewmates");
//! let module = MemoryModule::new("TownOfUs", Some("1.2.1")).with_type(history);
//! let runtime = MemoryRuntime::new().with_module(module);
//!
//! assert_eq!(runtime.modules().len(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::traits::{
    BindingError, EnumValue, ForeignMember, ForeignModule, ForeignObject, ForeignRuntime,
    ForeignType, ForeignValue, MemberRef, ModuleRef, SessionInfo, TypeRef,
};

/// How a [`MemoryObject`] exposes its elements, if at all.
#[derive(Debug, Clone)]
enum Elements {
    None,
    Iterable(Vec<ForeignValue>),
    Indexed(Vec<ForeignValue>),
    Dictionary(Vec<(ForeignValue, ForeignValue)>),
}

/// In-memory foreign object.
#[derive(Debug, Clone)]
pub struct MemoryObject {
    type_name: String,
    members: HashMap<String, ForeignValue>,
    methods: HashMap<String, ForeignValue>,
    /// Generic methods: method name -> (type argument full name -> result)
    generic_methods: HashMap<String, HashMap<String, ForeignValue>>,
    elements: Elements,
    /// Member and method names whose access raises a foreign error.
    faults: HashSet<String>,
    /// Indices whose `get_Item` call raises a foreign error.
    faulting_indices: HashSet<usize>,
}

impl MemoryObject {
    /// Create an empty object of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            members: HashMap::new(),
            methods: HashMap::new(),
            generic_methods: HashMap::new(),
            elements: Elements::None,
            faults: HashSet::new(),
            faulting_indices: HashSet::new(),
        }
    }

    /// Create a generically iterable list.
    pub fn list(items: Vec<ForeignValue>) -> Self {
        let mut obj = Self::new("List");
        obj.elements = Elements::Iterable(items);
        obj
    }

    /// Create a collection reachable only through `Count` and `get_Item`.
    pub fn indexed(items: Vec<ForeignValue>) -> Self {
        let mut obj = Self::new("Il2CppList");
        obj.elements = Elements::Indexed(items);
        obj
    }

    /// Create a dictionary with entries in the given iteration order.
    pub fn dictionary(entries: Vec<(ForeignValue, ForeignValue)>) -> Self {
        let mut obj = Self::new("Dictionary");
        obj.elements = Elements::Dictionary(entries);
        obj
    }

    /// Create a list of key/value pair objects.
    pub fn pairs(entries: Vec<(ForeignValue, ForeignValue)>) -> Self {
        let items = entries
            .into_iter()
            .map(|(k, v)| {
                MemoryObject::new("KeyValuePair")
                    .with_member("Key", k)
                    .with_member("Value", v)
                    .into_value()
            })
            .collect();
        Self::list(items)
    }

    /// Add a field or property.
    pub fn with_member(mut self, name: impl Into<String>, value: impl Into<ForeignValue>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    /// Add a field holding an enum value.
    pub fn with_enum_member(
        self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        self.with_member(
            name,
            EnumValue {
                type_name: type_name.into(),
                name: variant.into(),
            },
        )
    }

    /// Add a zero-argument method that returns a constant.
    pub fn with_method(mut self, name: impl Into<String>, result: impl Into<ForeignValue>) -> Self {
        self.methods.insert(name.into(), result.into());
        self
    }

    /// Add a generic method result for one type argument.
    pub fn with_generic_method(
        mut self,
        name: impl Into<String>,
        type_arg: impl Into<String>,
        result: impl Into<ForeignValue>,
    ) -> Self {
        self.generic_methods
            .entry(name.into())
            .or_default()
            .insert(type_arg.into(), result.into());
        self
    }

    /// Make reading the member or invoking the method with this name fail.
    pub fn with_fault(mut self, name: impl Into<String>) -> Self {
        self.faults.insert(name.into());
        self
    }

    /// Make `get_Item` fail for one index of an indexed collection.
    pub fn with_faulting_index(mut self, index: usize) -> Self {
        self.faulting_indices.insert(index);
        self
    }

    /// Wrap into a shareable foreign value.
    pub fn into_value(self) -> ForeignValue {
        ForeignValue::Object(Arc::new(self))
    }
}

impl ForeignObject for MemoryObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn member(&self, name: &str) -> Option<ForeignValue> {
        if self.faults.contains(name) {
            return None;
        }
        if let Elements::Indexed(items) = &self.elements {
            if name == "Count" {
                return Some(ForeignValue::Int(items.len() as i64));
            }
        }
        self.members.get(name).cloned()
    }

    fn has_method(&self, name: &str) -> bool {
        match &self.elements {
            Elements::Indexed(_) if name == "get_Item" => true,
            _ => self.methods.contains_key(name),
        }
    }

    fn invoke(&self, name: &str, args: &[ForeignValue]) -> Result<ForeignValue, BindingError> {
        if self.faults.contains(name) {
            return Err(BindingError::Invocation(format!(
                "{}.{} threw",
                self.type_name, name
            )));
        }
        if let (Elements::Indexed(items), "get_Item") = (&self.elements, name) {
            let index = args
                .first()
                .and_then(ForeignValue::as_i64)
                .and_then(|i| usize::try_from(i).ok())
                .ok_or_else(|| BindingError::Invocation("get_Item requires an index".into()))?;
            if self.faulting_indices.contains(&index) {
                return Err(BindingError::Invocation(format!(
                    "{}.get_Item({}) threw",
                    self.type_name, index
                )));
            }
            return items
                .get(index)
                .cloned()
                .ok_or_else(|| BindingError::Invocation(format!("index {} out of range", index)));
        }
        self.methods
            .get(name)
            .cloned()
            .ok_or_else(|| BindingError::MethodNotFound(name.to_string()))
    }

    fn has_generic_method(&self, name: &str) -> bool {
        self.generic_methods.contains_key(name)
    }

    fn invoke_generic(
        &self,
        name: &str,
        type_args: &[TypeRef],
        _args: &[ForeignValue],
    ) -> Result<ForeignValue, BindingError> {
        if self.faults.contains(name) {
            return Err(BindingError::Invocation(format!(
                "{}.{} threw",
                self.type_name, name
            )));
        }
        let by_type = self
            .generic_methods
            .get(name)
            .ok_or_else(|| BindingError::MethodNotFound(name.to_string()))?;
        let type_arg = type_args
            .first()
            .ok_or_else(|| BindingError::Invocation(format!("{} requires a type argument", name)))?;
        Ok(by_type
            .get(type_arg.full_name())
            .cloned()
            .unwrap_or(ForeignValue::Null))
    }

    fn items(&self) -> Option<Vec<ForeignValue>> {
        match &self.elements {
            Elements::Iterable(items) => Some(items.clone()),
            _ => None,
        }
    }

    fn entries(&self) -> Option<Vec<(ForeignValue, ForeignValue)>> {
        match &self.elements {
            Elements::Dictionary(entries) => Some(entries.clone()),
            _ => None,
        }
    }
}

/// In-memory static member.
#[derive(Debug, Clone)]
pub struct MemoryMember {
    name: String,
    value: Option<ForeignValue>,
}

impl ForeignMember for MemoryMember {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<ForeignValue, BindingError> {
        self.value
            .clone()
            .ok_or_else(|| BindingError::Invocation(format!("reading {} threw", self.name)))
    }
}

/// In-memory foreign type.
#[derive(Debug, Clone)]
pub struct MemoryType {
    full_name: String,
    nested: HashMap<String, TypeRef>,
    statics: HashMap<String, MemberRef>,
}

impl MemoryType {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            nested: HashMap::new(),
            statics: HashMap::new(),
        }
    }

    /// Add a public nested type, addressable by its simple name.
    pub fn with_nested(mut self, simple_name: impl Into<String>, nested: MemoryType) -> Self {
        self.nested.insert(simple_name.into(), Arc::new(nested));
        self
    }

    /// Add a static member with a value.
    pub fn with_static(mut self, name: impl Into<String>, value: impl Into<ForeignValue>) -> Self {
        let name = name.into();
        self.statics.insert(
            name.clone(),
            Arc::new(MemoryMember {
                name,
                value: Some(value.into()),
            }),
        );
        self
    }

    /// Add a static member whose read always fails.
    pub fn with_faulting_static(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.statics
            .insert(name.clone(), Arc::new(MemoryMember { name, value: None }));
        self
    }
}

impl ForeignType for MemoryType {
    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn nested_type(&self, name: &str) -> Option<TypeRef> {
        self.nested.get(name).cloned()
    }

    fn static_member(&self, name: &str) -> Option<MemberRef> {
        self.statics.get(name).cloned()
    }
}

/// In-memory loaded module.
#[derive(Debug, Clone)]
pub struct MemoryModule {
    name: String,
    version: Option<String>,
    types: HashMap<String, TypeRef>,
}

impl MemoryModule {
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version: version.map(str::to_string),
            types: HashMap::new(),
        }
    }

    /// Add a top-level type, addressable by its full name.
    pub fn with_type(mut self, ty: MemoryType) -> Self {
        self.types.insert(ty.full_name.clone(), Arc::new(ty));
        self
    }
}

impl ForeignModule for MemoryModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<String> {
        self.version.clone()
    }

    fn find_type(&self, full_name: &str) -> Option<TypeRef> {
        self.types.get(full_name).cloned()
    }
}

/// In-memory host process.
#[derive(Debug, Clone, Default)]
pub struct MemoryRuntime {
    modules: Vec<ModuleRef>,
    live_players: Vec<ForeignValue>,
    session: SessionInfo,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module: MemoryModule) -> Self {
        self.modules.push(Arc::new(module));
        self
    }

    pub fn with_live_player(mut self, player: ForeignValue) -> Self {
        self.live_players.push(player);
        self
    }

    pub fn with_session(mut self, session: SessionInfo) -> Self {
        self.session = session;
        self
    }
}

impl ForeignRuntime for MemoryRuntime {
    fn modules(&self) -> Vec<ModuleRef> {
        self.modules.clone()
    }

    fn live_players(&self) -> Result<ForeignValue, BindingError> {
        Ok(MemoryObject::list(self.live_players.clone()).into_value())
    }

    fn session(&self) -> SessionInfo {
        self.session.clone()
    }
}
