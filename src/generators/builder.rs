//! Builds a generator from a declared type.
//!
//! Bounds come from the session configuration. Nominal types are then
//! narrowed by the ranges the constraint extractor derives from their `where`
//! clause; parameters can additionally be narrowed by a callable's
//! precondition. Narrowing only ever intersects with the configured bounds.

use super::{
    ArrayGenerator, BoolGenerator, ByteGenerator, FunctionGenerator, Generator, IntegerGenerator,
    NominalGenerator, NullGenerator, RecordGenerator, ReferenceGenerator, UnionGenerator,
};
use crate::collaborators::Evaluator;
use crate::config::GenerationConfig;
use crate::error::{GenerationError, GenerationResult, RuntimeFault};
use crate::expr::Expr;
use crate::extract::ConstraintExtractor;
use crate::interval::IntervalRange;
use crate::types::{NominalType, Parameter, Type};
use log::debug;

pub struct GeneratorBuilder<'a, E: Evaluator + ?Sized> {
    config: &'a GenerationConfig,
    evaluator: &'a E,
}

impl<'a, E: Evaluator + ?Sized> GeneratorBuilder<'a, E> {
    pub fn new(config: &'a GenerationConfig, evaluator: &'a E) -> Self {
        Self { config, evaluator }
    }

    pub fn build(&self, ty: &Type) -> GenerationResult<Generator> {
        let generator = match ty {
            Type::Null => Generator::Null(NullGenerator::new()),
            Type::Bool => Generator::Bool(BoolGenerator::new()),
            Type::Byte => Generator::Byte(ByteGenerator::new()),
            Type::Int => Generator::Integer(IntegerGenerator::new(
                self.config.int_lower(),
                self.config.int_upper(),
            )?),
            Type::Array(element) => Generator::Array(ArrayGenerator::new(
                self.build(element)?,
                self.config.array_min_size,
                self.config.array_max_size,
            )?),
            Type::Record(fields) => Generator::Record(RecordGenerator::new(
                fields
                    .iter()
                    .map(|(name, field)| Ok((name.clone(), self.build(field)?)))
                    .collect::<GenerationResult<Vec<_>>>()?,
            )),
            Type::Union(alternatives) => Generator::Union(UnionGenerator::new(
                alternatives
                    .iter()
                    .map(|alternative| self.build(alternative))
                    .collect::<GenerationResult<Vec<_>>>()?,
            )?),
            Type::Reference(inner) => Generator::Reference(ReferenceGenerator::new(self.build(inner)?)),
            Type::Function(function) => Generator::Function(FunctionGenerator::new(
                function.parameters.len(),
                function
                    .returns
                    .iter()
                    .map(|ret| self.build(ret))
                    .collect::<GenerationResult<Vec<_>>>()?,
            )),
            Type::Nominal(nominal) => Generator::Nominal(self.build_nominal(nominal)?),
        };
        Ok(generator)
    }

    /// Generator for a parameter, narrowed by any constraint `requires` puts
    /// on the parameter itself (`name` or `|name|`, never a field `p.name`)
    pub fn build_for_parameter(&self, parameter: &Parameter, requires: &[Expr]) -> GenerationResult<Generator> {
        let mut generator = self.build(&parameter.ty)?;
        let extractor = ConstraintExtractor::new(self.evaluator).variables_only();
        if let Some(range) = self.extract(&extractor, requires, &parameter.name)? {
            debug!("Precondition narrows parameter '{}' to {}", parameter.name, range);
            generator.narrow(&range)?;
        }
        Ok(generator)
    }

    fn build_nominal(&self, nominal: &NominalType) -> GenerationResult<NominalGenerator> {
        let mut inner = self.build(&nominal.base)?;
        let extractor = ConstraintExtractor::new(self.evaluator);
        let range = match (&*nominal.base, &mut inner) {
            // each field is narrowed by the clauses that mention it
            (Type::Record(fields), Generator::Record(record)) => {
                for (field, _) in fields {
                    if let Some(range) = self.extract(&extractor, &nominal.invariant, field)? {
                        if let Some(generator) = record.field_mut(field) {
                            generator.narrow(&range)?;
                        }
                    }
                }
                IntervalRange::top()
            }
            _ => self
                .extract(&extractor, &nominal.invariant, &nominal.variable)?
                .unwrap_or_else(IntervalRange::top),
        };
        NominalGenerator::new(&nominal.name, inner, range)
    }

    fn extract(
        &self,
        extractor: &ConstraintExtractor<'_, E>,
        conjuncts: &[Expr],
        name: &str,
    ) -> GenerationResult<Option<IntervalRange>> {
        extractor
            .extract_all(conjuncts, name)
            .map_err(|fault: RuntimeFault| GenerationError::CannotGenerate {
                reason: format!("constraint on '{}' could not be evaluated: {}", name, fault),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::ExprEvaluator;
    use crate::value::Value;

    fn config() -> GenerationConfig {
        GenerationConfig {
            int_lower: -5,
            int_upper: 15,
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn test_window_from_invariant() {
        let config = config();
        let evaluator = ExprEvaluator::new();
        let builder = GeneratorBuilder::new(&config, &evaluator);
        let window = Type::Nominal(NominalType::new(
            "window",
            "x",
            Type::Int,
            vec![Expr::And(vec![
                Expr::gt(Expr::var("x"), Expr::int(3)),
                Expr::lt(Expr::var("x"), Expr::int(10)),
            ])],
        ));
        let mut generator = builder.build(&window).unwrap();
        let drawn: Vec<Value> = (0..7).map(|_| generator.next()).collect();
        let expected: Vec<Value> = [4, 5, 6, 7, 8, 9, 4].iter().map(|&n| Value::int(n)).collect();
        assert_eq!(drawn, expected);
    }

    #[test]
    fn test_negated_invariant_is_empty() {
        let config = config();
        let evaluator = ExprEvaluator::new();
        let builder = GeneratorBuilder::new(&config, &evaluator);
        let ty = Type::Nominal(NominalType::new(
            "odd",
            "x",
            Type::Int,
            vec![Expr::not(Expr::lt(Expr::var("x"), Expr::int(5)))],
        ));
        assert!(matches!(builder.build(&ty), Err(GenerationError::CannotGenerate { .. })));
    }

    #[test]
    fn test_nominal_record_narrows_fields() {
        let config = config();
        let evaluator = ExprEvaluator::new();
        let builder = GeneratorBuilder::new(&config, &evaluator);
        let point = Type::Nominal(NominalType::new(
            "point",
            "p",
            Type::record(vec![("x", Type::Int), ("y", Type::Bool)]),
            vec![Expr::equals(Expr::field(Expr::var("p"), "x"), Expr::int(7))],
        ));
        let mut generator = builder.build(&point).unwrap();
        assert_eq!(generator.cardinality(), 2);
        assert_eq!(
            generator.next(),
            Value::record(vec![("x", Value::int(7)), ("y", Value::Bool(false))])
        );
    }

    #[test]
    fn test_precondition_narrows_parameter() {
        let config = config();
        let evaluator = ExprEvaluator::new();
        let builder = GeneratorBuilder::new(&config, &evaluator);
        let requires = vec![Expr::ge(Expr::var("n"), Expr::int(0)), Expr::lt(Expr::var("m"), Expr::int(0))];
        let generator = builder
            .build_for_parameter(&Parameter::new("n", Type::Int), &requires)
            .unwrap();
        assert_eq!(generator.cardinality(), 15);
        let generator = builder
            .build_for_parameter(&Parameter::new("m", Type::Int), &requires)
            .unwrap();
        assert_eq!(generator.cardinality(), 5);
    }

    #[test]
    fn test_precondition_on_field_leaves_same_named_parameter_alone() {
        let config = GenerationConfig {
            int_lower: -3,
            int_upper: 3,
            ..GenerationConfig::default()
        };
        let evaluator = ExprEvaluator::new();
        let builder = GeneratorBuilder::new(&config, &evaluator);
        let requires = vec![Expr::gt(Expr::field(Expr::var("p"), "x"), Expr::int(1))];
        let generator = builder
            .build_for_parameter(&Parameter::new("x", Type::Int), &requires)
            .unwrap();
        assert_eq!(generator.cardinality(), 6);
    }

    #[test]
    fn test_array_length_precondition() {
        let config = GenerationConfig {
            array_max_size: 4,
            ..config()
        };
        let evaluator = ExprEvaluator::new();
        let builder = GeneratorBuilder::new(&config, &evaluator);
        let requires = vec![Expr::le(Expr::length(Expr::var("xs")), Expr::int(1))];
        let generator = builder
            .build_for_parameter(&Parameter::new("xs", Type::array(Type::Bool)), &requires)
            .unwrap();
        assert_eq!(generator.cardinality(), 1 + 2);
    }

    #[test]
    fn test_union_and_function_types() {
        let config = config();
        let evaluator = ExprEvaluator::new();
        let builder = GeneratorBuilder::new(&config, &evaluator);
        let maybe = Type::Union(vec![Type::Null, Type::Bool]);
        assert_eq!(builder.build(&maybe).unwrap().cardinality(), 3);
        let predicate = Type::Function(crate::types::FunctionType {
            parameters: vec![Type::Int],
            returns: vec![Type::Bool],
        });
        assert_eq!(builder.build(&predicate).unwrap().cardinality(), 2);
    }
}
