//! Plain, serializable form of a sketch.
//!
//! Values live in a flat cell table; figures refer to cells by index, and
//! two coordinates referring to the same index are linked. Relations refer
//! to figures by id, optionally narrowed to one child figure.

use super::relation::{Operand, RelationKind};
use super::relations;
use super::solver::SolverConfig;
use super::types::{EntityId, Sketch};
use crate::error::SketchError;
use crate::geometry::{Arc, Circle, Figure, FigureKind, Line, Point, Shape};
use crate::variables::{CellId, Variable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub value: f64,
    #[serde(default)]
    pub constant: bool,
}

/// Cell indices of a point's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeRecord {
    Point { x: usize, y: usize },
    Line { p0: PointRecord, p1: PointRecord },
    Circle { c: PointRecord, r: usize },
    Arc { c: PointRecord, r: usize, p0: PointRecord, p1: PointRecord },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureRecord {
    pub id: EntityId,
    pub shape: ShapeRecord,
}

/// A figure of the sketch, or with `part` set, one of its child figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureRef {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<usize>,
}

/// The `index`-th variable of a figure, in `Shape::variables` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRef {
    pub figure: EntityId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandRecord {
    Figure(FigureRef),
    Variable(VariableRef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub kind: RelationKind,
    pub operands: Vec<OperandRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SketchDocument {
    pub cells: Vec<CellRecord>,
    pub figures: Vec<FigureRecord>,
    #[serde(default)]
    pub relations: Vec<RelationRecord>,
    #[serde(default)]
    pub config: SolverConfig,
}

impl SketchDocument {
    pub fn from_json(json: &str) -> Result<Self, SketchError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SketchError> {
        Ok(serde_json::to_string(self)?)
    }
}

// =============================================================================
// Loading
// =============================================================================

struct CellTable {
    prototypes: Vec<Variable>,
}

impl CellTable {
    fn new(cells: &[CellRecord]) -> Self {
        let prototypes = cells
            .iter()
            .map(|c| {
                if c.constant {
                    Variable::constant(c.value)
                } else {
                    Variable::new(c.value)
                }
            })
            .collect();
        Self { prototypes }
    }

    /// A fresh variable sharing the cell at `index`.
    fn variable(&self, index: usize) -> Result<Variable, SketchError> {
        let prototype = self
            .prototypes
            .get(index)
            .ok_or(SketchError::UnknownCell(index))?;
        let variable = Variable::new(prototype.value());
        variable.link(prototype);
        Ok(variable)
    }

    fn point(&self, record: &PointRecord) -> Result<Point, SketchError> {
        Ok(Point::from_variables(
            self.variable(record.x)?,
            self.variable(record.y)?,
        ))
    }

    fn figure(&self, shape: &ShapeRecord) -> Result<Figure, SketchError> {
        let figure = match shape {
            ShapeRecord::Point { x, y } => Figure::Point(self.point(&PointRecord { x: *x, y: *y })?),
            ShapeRecord::Line { p0, p1 } => Figure::Line(Line {
                p0: self.point(p0)?,
                p1: self.point(p1)?,
            }),
            ShapeRecord::Circle { c, r } => Figure::Circle(Circle {
                c: self.point(c)?,
                r: self.variable(*r)?,
            }),
            ShapeRecord::Arc { c, r, p0, p1 } => Figure::Arc(Arc {
                c: self.point(c)?,
                r: self.variable(*r)?,
                p0: self.point(p0)?,
                p1: self.point(p1)?,
            }),
        };
        Ok(figure)
    }
}

/// Numbers value cells in order of first use while saving.
#[derive(Default)]
struct CellNumbering {
    records: Vec<CellRecord>,
    index: HashMap<CellId, usize>,
}

impl CellNumbering {
    fn index(&mut self, variable: &Variable) -> usize {
        let records = &mut self.records;
        *self.index.entry(variable.cell_id()).or_insert_with(|| {
            records.push(CellRecord {
                value: variable.value(),
                constant: variable.is_constant(),
            });
            records.len() - 1
        })
    }

    fn point(&mut self, point: &Point) -> PointRecord {
        PointRecord {
            x: self.index(&point.x),
            y: self.index(&point.y),
        }
    }
}

impl Sketch {
    /// Rebuild a live sketch. Every reference is checked; a malformed
    /// document is an error, never a panic.
    pub fn from_document(document: &SketchDocument) -> Result<Self, SketchError> {
        document.config.validate()?;
        let cells = CellTable::new(&document.cells);
        let mut sketch = Sketch::with_config(document.config);

        for record in &document.figures {
            let figure = cells.figure(&record.shape)?;
            sketch.insert_figure(record.id, figure)?;
        }

        for record in &document.relations {
            let operands = record
                .operands
                .iter()
                .map(|o| sketch.resolve_operand(o))
                .collect::<Result<Vec<_>, _>>()?;
            sketch.add_boxed_relation(relations::build(record.kind, &operands)?);
        }

        debug!(
            cells = document.cells.len(),
            figures = sketch.entities.len(),
            relations = sketch.relations.len(),
            "Loaded sketch document"
        );
        Ok(sketch)
    }

    pub fn resolve_figure(&self, reference: &FigureRef) -> Result<Figure, SketchError> {
        let figure = self
            .figure(reference.id)
            .ok_or(SketchError::UnknownFigure(reference.id))?;
        match reference.part {
            None => Ok(figure.clone()),
            Some(part) => figure
                .child_figures()
                .into_iter()
                .nth(part)
                .ok_or(SketchError::UnknownPart {
                    figure: reference.id,
                    part,
                }),
        }
    }

    pub fn resolve_variable(&self, reference: &VariableRef) -> Result<Variable, SketchError> {
        let figure = self
            .figure(reference.figure)
            .ok_or(SketchError::UnknownFigure(reference.figure))?;
        figure
            .variables()
            .into_iter()
            .nth(reference.index)
            .ok_or(SketchError::UnknownVariable {
                figure: reference.figure,
                index: reference.index,
            })
    }

    fn resolve_operand(&self, record: &OperandRecord) -> Result<Operand, SketchError> {
        match record {
            OperandRecord::Figure(r) => self.resolve_figure(r).map(Operand::Figure),
            OperandRecord::Variable(r) => self.resolve_variable(r).map(Operand::Variable),
        }
    }

    // =========================================================================
    // Saving
    // =========================================================================

    /// Snapshot current values, links and relations.
    pub fn to_document(&self) -> Result<SketchDocument, SketchError> {
        let mut cells = CellNumbering::default();
        let mut figures = Vec::with_capacity(self.entities.len());
        for entity in &self.entities {
            let shape = match &entity.figure {
                Figure::Point(p) => ShapeRecord::Point {
                    x: cells.index(&p.x),
                    y: cells.index(&p.y),
                },
                Figure::Line(l) => ShapeRecord::Line {
                    p0: cells.point(&l.p0),
                    p1: cells.point(&l.p1),
                },
                Figure::Circle(c) => ShapeRecord::Circle {
                    c: cells.point(&c.c),
                    r: cells.index(&c.r),
                },
                Figure::Arc(a) => ShapeRecord::Arc {
                    c: cells.point(&a.c),
                    r: cells.index(&a.r),
                    p0: cells.point(&a.p0),
                    p1: cells.point(&a.p1),
                },
            };
            figures.push(FigureRecord {
                id: entity.id,
                shape,
            });
        }

        let relations = self
            .relations
            .iter()
            .map(|relation| {
                let kind = relation.kind();
                let operands = relation
                    .operands()
                    .iter()
                    .map(|o| self.record_operand(kind, o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RelationRecord { kind, operands })
            })
            .collect::<Result<Vec<_>, SketchError>>()?;

        Ok(SketchDocument {
            cells: cells.records,
            figures,
            relations,
            config: self.config,
        })
    }

    fn record_operand(&self, kind: RelationKind, operand: &Operand) -> Result<OperandRecord, SketchError> {
        match operand {
            Operand::Figure(figure) => self
                .find_figure_ref(figure)
                .map(OperandRecord::Figure)
                .ok_or(SketchError::DetachedOperand { kind }),
            Operand::Variable(variable) => self
                .find_variable_ref(variable)
                .map(OperandRecord::Variable)
                .ok_or(SketchError::DetachedOperand { kind }),
        }
    }

    fn find_figure_ref(&self, figure: &Figure) -> Option<FigureRef> {
        let matches = |candidate: &Figure| {
            candidate.is_same(figure)
                || (figure.kind() == FigureKind::Circle
                    && candidate.kind() == FigureKind::Arc
                    && candidate
                        .as_circle()
                        .is_some_and(|c| Figure::Circle(c).is_same(figure)))
        };

        for entity in &self.entities {
            if matches(&entity.figure) {
                return Some(FigureRef {
                    id: entity.id,
                    part: None,
                });
            }
        }
        for entity in &self.entities {
            if let Some(part) = entity.figure.child_figures().iter().position(|c| c.is_same(figure)) {
                return Some(FigureRef {
                    id: entity.id,
                    part: Some(part),
                });
            }
        }
        None
    }

    fn find_variable_ref(&self, variable: &Variable) -> Option<VariableRef> {
        self.entities.iter().find_map(|entity| {
            entity
                .figure
                .variables()
                .iter()
                .position(|v| v.same_variable(variable))
                .map(|index| VariableRef {
                    figure: entity.id,
                    index,
                })
        })
    }
}
