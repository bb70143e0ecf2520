//! The global class table.
//!
//! Each class gets a [`ClassDescriptor`] with its layout (field types by field
//! offset, method signatures by dispatch slot) and a [`VirtualTable`] mapping
//! member names to entries. A subclass starts from copies of both and then
//! overlays its own members, so inherited members keep their offsets.
//!
//! The table is filled while the symbol table pass walks class declarations
//! and is read-only afterwards.

use fool_core::{ArrowType, ClassId, Type};
use rustc_hash::FxHashMap;

use crate::scope::ScopeTable;
use crate::symbols::{EntryKind, SymbolEntry};

// ============================================================================
// ClassDescriptor
// ============================================================================

/// Layout and ancestry of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub id: ClassId,
    pub name: String,
    pub superclass: Option<ClassId>,
    /// Field types in declaration order. The first field sits at offset -1
    /// and each one takes as many words as its type.
    pub fields: Vec<Type>,
    /// Method signatures; index `i` holds the method in dispatch slot `i`.
    pub methods: Vec<ArrowType>,
    /// Proper ancestors, nearest first.
    pub ancestors: Vec<ClassId>,
}

impl ClassDescriptor {
    /// Offset of each field, in declaration order.
    pub fn field_offsets(&self) -> impl Iterator<Item = i32> + '_ {
        self.fields.iter().scan(-1, |next, ty| {
            let offset = *next;
            *next -= ty.words() as i32;
            Some(offset)
        })
    }

    /// Convert a field offset into an index into `fields`.
    pub fn field_index(&self, offset: i32) -> Option<usize> {
        self.field_offsets().position(|o| o == offset)
    }

    pub fn field_type(&self, offset: i32) -> Option<&Type> {
        self.field_index(offset).and_then(|i| self.fields.get(i))
    }

    /// Words taken by the fields, below the dispatch table pointer.
    pub fn field_words(&self) -> usize {
        self.fields.iter().map(Type::words).sum()
    }

    /// Offset the next new field would get.
    pub fn next_field_offset(&self) -> i32 {
        -(self.field_words() as i32) - 1
    }

    pub fn method_type(&self, offset: i32) -> Option<&ArrowType> {
        usize::try_from(offset)
            .ok()
            .and_then(|i| self.methods.get(i))
    }

    /// Whether `other` is this class or one of its ancestors.
    pub fn is_descendant_of(&self, other: ClassId) -> bool {
        self.id == other || self.ancestors.contains(&other)
    }

    /// This class followed by its ancestors, nearest first.
    pub fn lineage(&self) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::once(self.id).chain(self.ancestors.iter().copied())
    }
}

// ============================================================================
// VirtualTable
// ============================================================================

/// Member names of a class, inherited ones included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualTable {
    members: ScopeTable,
}

impl VirtualTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.members.get(name)
    }

    /// Add or override a member.
    pub fn insert(&mut self, name: &str, entry: SymbolEntry) {
        self.members.insert(name.to_string(), entry);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolEntry)> {
        self.members.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Fields, sorted by offset from -1 downward.
    pub fn fields(&self) -> Vec<(&str, &SymbolEntry)> {
        let mut fields: Vec<_> = self
            .iter()
            .filter(|(_, entry)| entry.kind == EntryKind::Field)
            .collect();
        fields.sort_by_key(|(_, entry)| -entry.offset);
        fields
    }

    /// Methods, sorted by dispatch slot.
    pub fn methods(&self) -> Vec<(&str, &SymbolEntry)> {
        let mut methods: Vec<_> = self
            .iter()
            .filter(|(_, entry)| entry.kind == EntryKind::Method)
            .collect();
        methods.sort_by_key(|(_, entry)| entry.offset);
        methods
    }

    /// Copy of the members, for seeding a class body scope.
    pub fn to_scope(&self) -> ScopeTable {
        self.members.clone()
    }
}

// ============================================================================
// ClassTable
// ============================================================================

/// Every class in the program, indexed by [`ClassId`].
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: Vec<ClassDescriptor>,
    vtables: Vec<VirtualTable>,
    by_name: FxHashMap<String, ClassId>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, copying the layout and virtual table of `superclass`.
    ///
    /// A name that is already taken keeps pointing at the first class; the
    /// new descriptor is still created so its body can be analysed.
    pub fn declare(&mut self, name: &str, superclass: Option<ClassId>) -> ClassId {
        let id = ClassId::new(self.classes.len() as u32);

        let parent = superclass.and_then(|s| self.get(s));
        let parent_id = parent.map(|p| p.id);
        let (fields, methods, ancestors, vtable) = match parent {
            Some(parent) => {
                let mut ancestors = Vec::with_capacity(parent.ancestors.len() + 1);
                ancestors.push(parent.id);
                ancestors.extend(parent.ancestors.iter().copied());
                (
                    parent.fields.clone(),
                    parent.methods.clone(),
                    ancestors,
                    self.vtables[parent.id.index()].clone(),
                )
            }
            None => (Vec::new(), Vec::new(), Vec::new(), VirtualTable::new()),
        };

        self.classes.push(ClassDescriptor {
            id,
            name: name.to_string(),
            superclass: parent_id,
            fields,
            methods,
            ancestors,
        });
        self.vtables.push(vtable);
        self.by_name.entry(name.to_string()).or_insert(id);
        id
    }

    pub fn get(&self, id: ClassId) -> Option<&ClassDescriptor> {
        self.classes.get(id.index())
    }

    pub fn get_mut(&mut self, id: ClassId) -> Option<&mut ClassDescriptor> {
        self.classes.get_mut(id.index())
    }

    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn vtable(&self, id: ClassId) -> Option<&VirtualTable> {
        self.vtables.get(id.index())
    }

    pub fn vtable_mut(&mut self, id: ClassId) -> Option<&mut VirtualTable> {
        self.vtables.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.iter()
    }

    pub fn name_of(&self, id: ClassId) -> &str {
        self.get(id).map_or("<unknown>", |class| class.name.as_str())
    }

    /// Render a type with class names instead of class ids.
    pub fn type_name(&self, ty: &Type) -> String {
        match ty {
            Type::Int => "int".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Empty => "null".to_string(),
            Type::Ref(id) => self.name_of(*id).to_string(),
            Type::Class(id) => format!("class {}", self.name_of(*id)),
            Type::Arrow(arrow) => {
                let params: Vec<_> = arrow.params.iter().map(|p| self.type_name(p)).collect();
                format!("({}) -> {}", params.join(", "), self.type_name(&arrow.ret))
            }
        }
    }
}
