//! Core types for the variable system.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a variable handle. Clones of a [`Variable`] share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableId(pub u64);

/// Identity of the value cell behind one or more linked variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u64);

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Shared value storage. Linked variables resolve to the same cell, and
/// constancy is stored here so a pin cannot be bypassed through a link.
///
/// Cells form a union-find forest: a cell that was merged into another
/// forwards to it, and only the root of a chain holds the live value.
#[derive(Debug)]
struct ValueCell {
    id: CellId,
    value: Cell<f64>,
    constant: Cell<bool>,
    merged_into: RefCell<Option<Rc<ValueCell>>>,
}

impl ValueCell {
    fn new(value: f64, constant: bool) -> Rc<Self> {
        Rc::new(Self {
            id: CellId(NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed)),
            value: Cell::new(value),
            constant: Cell::new(constant),
            merged_into: RefCell::new(None),
        })
    }

    fn root(cell: &Rc<Self>) -> Rc<Self> {
        let mut current = Rc::clone(cell);
        loop {
            let next = current.merged_into.borrow().clone();
            match next {
                Some(next) => current = next,
                None => return current,
            }
        }
    }
}

#[derive(Debug)]
struct VariableInner {
    id: VariableId,
    cell: RefCell<Rc<ValueCell>>,
}

/// A scalar unknown of a sketch.
///
/// `Variable` is a handle: `clone()` returns another handle to the *same*
/// variable, which is how relations refer to the coordinates of the
/// figures they constrain. Use [`Variable::deep_copy`] for an independent
/// variable.
#[derive(Clone)]
pub struct Variable {
    inner: Rc<VariableInner>,
}

impl Variable {
    /// Create a free variable holding `value`.
    pub fn new(value: f64) -> Self {
        Self::with_cell(ValueCell::new(value, false))
    }

    /// Create a pinned variable holding `value`.
    pub fn constant(value: f64) -> Self {
        Self::with_cell(ValueCell::new(value, true))
    }

    fn with_cell(cell: Rc<ValueCell>) -> Self {
        Self {
            inner: Rc::new(VariableInner {
                id: VariableId(NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed)),
                cell: RefCell::new(cell),
            }),
        }
    }

    /// The live cell of this variable's link group.
    fn cell(&self) -> Rc<ValueCell> {
        let held = Rc::clone(&self.inner.cell.borrow());
        if held.merged_into.borrow().is_none() {
            return held;
        }
        let root = ValueCell::root(&held);
        *self.inner.cell.borrow_mut() = Rc::clone(&root);
        root
    }

    pub fn id(&self) -> VariableId {
        self.inner.id
    }

    pub fn cell_id(&self) -> CellId {
        self.cell().id
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.cell().value.get()
    }

    /// Write a new value. This is the external assignment path and ignores
    /// constancy; the solver checks [`Variable::is_constant`] itself.
    #[inline]
    pub fn set_value(&self, value: f64) {
        self.cell().value.set(value);
    }

    /// Add `delta` to the current value.
    #[inline]
    pub fn shift(&self, delta: f64) {
        let cell = self.cell();
        cell.value.set(cell.value.get() + delta);
    }

    pub fn is_constant(&self) -> bool {
        self.cell().constant.get()
    }

    /// Pin or release the value. Applies to every variable linked to this one.
    pub fn set_constant(&self, constant: bool) {
        self.cell().constant.set(constant);
    }

    /// Merge this variable's link group into `other`'s.
    ///
    /// Every variable already linked to either side ends up sharing one
    /// cell, so links made earlier are never undone. The merged cell takes
    /// `other`'s value unless only `self`'s group is pinned, in which case
    /// it takes `self`'s value and stays pinned. When both groups are
    /// pinned, `other`'s pin wins.
    pub fn link(&self, other: &Variable) {
        let own = self.cell();
        let target = other.cell();
        if Rc::ptr_eq(&own, &target) {
            return;
        }
        if own.constant.get() {
            if !target.constant.get() {
                target.value.set(own.value.get());
                target.constant.set(true);
            } else if own.value.get() != target.value.get() {
                warn!(
                    kept = target.value.get(),
                    dropped = own.value.get(),
                    "Linked two pinned cells with different values"
                );
            }
        }
        *own.merged_into.borrow_mut() = Some(Rc::clone(&target));
        *self.inner.cell.borrow_mut() = target;
    }

    /// True if both handles read and write the same value cell.
    pub fn is_linked_to(&self, other: &Variable) -> bool {
        Rc::ptr_eq(&self.cell(), &other.cell())
    }

    /// True if both handles refer to the same variable.
    pub fn same_variable(&self, other: &Variable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// A new, unlinked variable with the same value and constancy.
    pub fn deep_copy(&self) -> Variable {
        let cell = self.cell();
        Self::with_cell(ValueCell::new(cell.value.get(), cell.constant.get()))
    }

    /// A new variable whose cell is shared with every other variable copied
    /// through the same `links` map from the same source cell.
    pub fn copy_with(&self, links: &mut LinkMap) -> Variable {
        let source = self.cell();
        let cell = links
            .cells
            .entry(source.id)
            .or_insert_with(|| ValueCell::new(source.value.get(), source.constant.get()));
        Self::with_cell(Rc::clone(cell))
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.cell();
        f.debug_struct("Variable")
            .field("id", &self.inner.id)
            .field("cell", &cell.id)
            .field("value", &cell.value.get())
            .field("constant", &cell.constant.get())
            .finish()
    }
}

impl From<f64> for Variable {
    fn from(value: f64) -> Self {
        Variable::new(value)
    }
}

/// Tracks source cell -> copied cell while deep-copying a group of
/// variables, so links inside the group survive the copy.
#[derive(Default)]
pub struct LinkMap {
    cells: HashMap<CellId, Rc<ValueCell>>,
}

impl LinkMap {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A proposed additive correction to one variable.
#[derive(Debug, Clone)]
pub struct VariableDelta {
    pub variable: Variable,
    pub delta: f64,
}

impl VariableDelta {
    pub fn new(variable: &Variable, delta: f64) -> Self {
        Self { variable: variable.clone(), delta }
    }

    /// Delta that moves `variable` onto `goal`.
    pub fn toward(variable: &Variable, goal: f64) -> Self {
        Self::new(variable, goal - variable.value())
    }
}

/// Saved constancy of a set of cells, used to pin figures for the
/// duration of one solve and restore them afterwards.
#[derive(Debug, Default)]
pub struct PinGuard {
    saved: Vec<(Variable, bool)>,
}

impl PinGuard {
    /// Pin every given variable, remembering the previous state once per cell.
    pub fn pin<'a>(variables: impl IntoIterator<Item = &'a Variable>) -> Self {
        let mut saved: Vec<(Variable, bool)> = Vec::new();
        for variable in variables {
            if saved.iter().any(|(v, _)| v.is_linked_to(variable)) {
                continue;
            }
            saved.push((variable.clone(), variable.is_constant()));
            variable.set_constant(true);
        }
        Self { saved }
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

impl Drop for PinGuard {
    fn drop(&mut self) {
        for (variable, was_constant) in self.saved.drain(..).rev() {
            variable.set_constant(was_constant);
        }
    }
}
