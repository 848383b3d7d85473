use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub struct HqlStatement<'a> {
    pub select_clause: Option<SelectClause<'a>>,
    pub from_clause: FromClause<'a>,
    pub where_clause: Option<WhereClause<'a>>,
    pub group_by_clause: Option<GroupByClause<'a>>,
    pub having_clause: Option<HavingClause<'a>>,
    pub order_by_clause: Option<OrderByClause<'a>>,
}

impl HqlStatement<'_> {
    /// Deepest boolean nesting over the WHERE and HAVING clauses
    pub fn predicate_depth(&self) -> usize {
        let where_depth = self
            .where_clause
            .as_ref()
            .map_or(0, |w| w.conditions.depth());
        let having_depth = self
            .having_clause
            .as_ref()
            .map_or(0, |h| h.conditions.depth());
        where_depth.max(having_depth)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct SelectClause<'a> {
    pub distinct: bool,
    pub select_items: Vec<SelectItem<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum SelectItem<'a> {
    Path(PathExpression<'a>),
    Aggregate(AggregateExpression<'a>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct FromClause<'a> {
    pub persister_spaces: Vec<PersisterSpace<'a>>,
    pub joins: Vec<JoinClause<'a>>,
}

/// `Entity [AS] alias` in the FROM clause
#[derive(Debug, PartialEq, Clone)]
pub struct PersisterSpace<'a> {
    /// Simple or dotted (qualified) entity name
    pub entity_name: &'a str,
    pub alias: Option<&'a str>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum JoinType {
    Inner,
    LeftOuter,
}

#[derive(Debug, PartialEq, Clone)]
pub struct JoinClause<'a> {
    pub join_type: JoinType,
    pub fetch: bool,
    pub path: PathExpression<'a>,
    pub alias: &'a str,
}

#[derive(Debug, PartialEq, Clone)]
pub struct WhereClause<'a> {
    pub conditions: BooleanExpression<'a>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct HavingClause<'a> {
    pub conditions: BooleanExpression<'a>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct GroupByClause<'a> {
    pub paths: Vec<PathExpression<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct OrderByClause<'a> {
    pub order_by_items: Vec<OrderByItem<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct OrderByItem<'a> {
    pub path: PathExpression<'a>,
    pub ascending: bool,
}

/// Dotted property reference, e.g. `e.author.name`, optionally indexed (`e.tags[0]`)
#[derive(Debug, PartialEq, Clone)]
pub struct PathExpression<'a> {
    pub segments: Vec<&'a str>,
    pub index: Option<Box<Operand<'a>>>,
}

impl<'a> PathExpression<'a> {
    pub fn new(segments: Vec<&'a str>) -> Self {
        PathExpression {
            segments,
            index: None,
        }
    }
}

impl fmt::Display for PathExpression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))?;
        if self.index.is_some() {
            write!(f, "[..]")?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

#[derive(Debug, PartialEq, Clone)]
pub struct AggregateExpression<'a> {
    pub function: AggregateFunction,
    pub distinct: bool,
    pub path: PathExpression<'a>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal<'a> {
    /// Quote-unescaped content of a `'...'` literal
    String(String),
    /// Numeric text kept verbatim, typed later against the property
    Numeric(&'a str),
    Boolean(bool),
}

impl Literal<'_> {
    /// Text handed to literal conversion
    pub fn text(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            Literal::Numeric(n) => n.to_string(),
            Literal::Boolean(b) => b.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operand<'a> {
    Path(PathExpression<'a>),
    Aggregate(AggregateExpression<'a>),
    Literal(Literal<'a>),
    NamedParameter(&'a str),
    /// `?` or `?N`
    PositionalParameter(Option<u32>),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

#[derive(Debug, PartialEq, Clone)]
pub enum BooleanExpression<'a> {
    And(Vec<BooleanExpression<'a>>),
    Or(Vec<BooleanExpression<'a>>),
    Not(Box<BooleanExpression<'a>>),
    Comparison {
        left: Operand<'a>,
        operator: ComparisonOperator,
        right: Operand<'a>,
    },
    Between {
        operand: Operand<'a>,
        lower: Operand<'a>,
        upper: Operand<'a>,
        negated: bool,
    },
    In {
        operand: Operand<'a>,
        values: Vec<Operand<'a>>,
        negated: bool,
    },
    Like {
        operand: Operand<'a>,
        pattern: Operand<'a>,
        escape: Option<char>,
        negated: bool,
    },
    IsNull {
        operand: Operand<'a>,
        negated: bool,
    },
}

impl BooleanExpression<'_> {
    pub fn depth(&self) -> usize {
        match self {
            BooleanExpression::And(children) | BooleanExpression::Or(children) => {
                1 + children.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
            BooleanExpression::Not(child) => 1 + child.depth(),
            _ => 1,
        }
    }
}
