use hoist_ir::{BinaryOp, CatchHandler};
use hoist_runtime::{encode_route, Route};

use super::*;
use crate::evaluate;

fn eval(arena: &ExprArena, root: ExprId) -> EvalResult {
    evaluate(arena, &ConstantPool::new(), root)
}

mod basics {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn literals_and_arithmetic() {
        let mut arena = ExprArena::new();
        let two = arena.int(2);
        let three = arena.int(3);
        let four = arena.int(4);
        let product = arena.binary(BinaryOp::Mul, three, four);
        let root = arena.binary(BinaryOp::Add, two, product);
        assert_eq!(eval(&arena, root).unwrap(), Value::Int(14));
    }

    #[test]
    fn if_selects_branch() {
        let mut arena = ExprArena::new();
        let one = arena.int(1);
        let two = arena.int(2);
        let cond = arena.binary(BinaryOp::Lt, one, two);
        let yes = arena.int(10);
        let no = arena.int(20);
        let root = arena.if_else(cond, yes, no);
        assert_eq!(eval(&arena, root).unwrap(), Value::Int(10));
    }

    #[test]
    fn if_requires_bool() {
        let mut arena = ExprArena::new();
        let cond = arena.int(1);
        let a = arena.unit();
        let b = arena.unit();
        let root = arena.if_else(cond, a, b);
        assert!(matches!(
            eval(&arena, root),
            Err(EvalError::TypeMismatch {
                expected: "bool",
                found: "int"
            })
        ));
    }

    #[test]
    fn block_locals_start_as_unit_and_take_assignments() {
        let mut arena = ExprArena::new();
        let x = arena.declare_var("x");
        let read_before = arena.var(x);
        let target = arena.var(x);
        let five = arena.int(5);
        let write = arena.assign(target, five);
        let read_after = arena.var(x);
        let before = arena.block(&[x], &[read_before]);
        let after = arena.block(&[x], &[write, read_after]);

        assert_eq!(eval(&arena, before).unwrap(), Value::Unit);
        assert_eq!(eval(&arena, after).unwrap(), Value::Int(5));
    }

    #[test]
    fn empty_block_is_unit() {
        let mut arena = ExprArena::new();
        let root = arena.block(&[], &[]);
        assert_eq!(eval(&arena, root).unwrap(), Value::Unit);
    }

    #[test]
    fn undefined_variable_is_reported_by_name() {
        let mut arena = ExprArena::new();
        let ghost = arena.declare_var("ghost");
        let root = arena.var(ghost);
        let err = eval(&arena, root).unwrap_err();
        assert_eq!(err.to_string(), "undefined variable `ghost`");
    }

    #[test]
    fn assigning_to_a_literal_is_rejected() {
        let mut arena = ExprArena::new();
        let target = arena.int(1);
        let value = arena.int(2);
        let root = arena.assign(target, value);
        assert!(matches!(eval(&arena, root), Err(EvalError::InvalidAssignmentTarget)));
    }

    #[test]
    fn host_bound_cell_is_read_and_written() {
        let mut arena = ExprArena::new();
        let x = arena.declare_var("x");
        let target = arena.var(x);
        let read = arena.var(x);
        let one = arena.int(1);
        let incremented = arena.binary(BinaryOp::Add, read, one);
        let root = arena.assign(target, incremented);

        let cell = StrongBox::new(Value::Int(41));
        let constants = ConstantPool::new();
        let mut interpreter = Interpreter::new(&arena, &constants);
        interpreter.bind(x, cell.clone());

        assert_eq!(interpreter.eval(root).unwrap(), Value::Int(42));
        assert_eq!(cell.get(), Value::Int(42));
    }
}

mod cells {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_reads_and_writes_constant_cell() {
        let mut arena = ExprArena::new();
        let mut constants = ConstantPool::new();
        let cell = StrongBox::new(Value::Int(7));
        let id = constants.push(Value::Cell(cell.clone()));

        let receiver = arena.constant(id);
        let target = arena.cell_value(receiver);
        let nine = arena.int(9);
        let write = arena.assign(target, nine);
        let receiver = arena.constant(id);
        let read = arena.cell_value(receiver);
        let root = arena.block(&[], &[write, read]);

        assert_eq!(evaluate(&arena, &constants, root).unwrap(), Value::Int(9));
        assert_eq!(cell.get(), Value::Int(9));
    }

    #[test]
    fn field_on_non_cell_is_a_type_mismatch() {
        let mut arena = ExprArena::new();
        let receiver = arena.int(3);
        let root = arena.cell_value(receiver);
        assert!(matches!(
            eval(&arena, root),
            Err(EvalError::TypeMismatch {
                expected: "cell",
                ..
            })
        ));
    }

    #[test]
    fn runtime_variables_alias_block_locals() {
        let mut arena = ExprArena::new();
        let a = arena.declare_var("a");
        let b = arena.declare_var("b");
        let list = arena.runtime_variables(&[b, a]);
        let target = arena.var(a);
        let three = arena.int(3);
        let write = arena.assign(target, three);
        let root = arena.block(&[a, b], &[write, list]);

        let Value::Variables(list) = eval(&arena, root).unwrap() else {
            panic!("expected a variable list");
        };
        assert_eq!(list.count(), 2);
        assert_eq!(list.get(0).unwrap(), Value::Unit);
        assert_eq!(list.get(1).unwrap(), Value::Int(3));
    }

    #[test]
    fn merge_builtin_produces_merged_list() {
        let mut arena = ExprArena::new();
        let mut constants = ConstantPool::new();
        let a = arena.declare_var("a");
        let bound_cell = StrongBox::new(Value::Int(100));
        let bound: VariableList = Arc::new(BoxedVariables::new(vec![bound_cell.clone()]));
        let routes: Arc<[i64]> = Arc::from(vec![
            encode_route(Route::Second(0)),
            encode_route(Route::First(0)),
        ]);

        let callee = constants.push(Value::Builtin(Builtin::MergeRuntimeVariables));
        let bound = constants.push(Value::Variables(bound));
        let routing = constants.push(Value::Routing(routes));
        let callee = arena.constant(callee);
        let free = arena.runtime_variables(&[a]);
        let bound = arena.constant(bound);
        let routing = arena.constant(routing);
        let merged = arena.call(callee, &[free, bound, routing]);
        let target = arena.var(a);
        let seven = arena.int(7);
        let write = arena.assign(target, seven);
        let root = arena.block(&[a], &[write, merged]);

        let Value::Variables(list) = evaluate(&arena, &constants, root).unwrap() else {
            panic!("expected a variable list");
        };
        assert_eq!(list.count(), 2);
        assert_eq!(list.get(0).unwrap(), Value::Int(100));
        assert_eq!(list.get(1).unwrap(), Value::Int(7));

        list.set(0, Value::Int(-1)).unwrap();
        assert_eq!(bound_cell.get(), Value::Int(-1));
    }

    #[test]
    fn merge_builtin_checks_arity() {
        let mut arena = ExprArena::new();
        let mut constants = ConstantPool::new();
        let callee = constants.push(Value::Builtin(Builtin::MergeRuntimeVariables));
        let callee = arena.constant(callee);
        let root = arena.call(callee, &[]);
        assert!(matches!(
            evaluate(&arena, &constants, root),
            Err(EvalError::ArityMismatch {
                expected: 3,
                got: 0
            })
        ));
    }
}

mod functions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn call_binds_parameters() {
        let mut arena = ExprArena::new();
        let x = arena.declare_var("x");
        let y = arena.declare_var("y");
        let x_ref = arena.var(x);
        let y_ref = arena.var(y);
        let body = arena.binary(BinaryOp::Sub, x_ref, y_ref);
        let lambda = arena.lambda(&[x, y], body);
        let ten = arena.int(10);
        let four = arena.int(4);
        let root = arena.call(lambda, &[ten, four]);
        assert_eq!(eval(&arena, root).unwrap(), Value::Int(6));
    }

    #[test]
    fn closures_share_captured_cells() {
        // { counter; counter = 0; bump = () => counter = counter + 1; bump(); bump(); counter }
        let mut arena = ExprArena::new();
        let counter = arena.declare_var("counter");
        let bump = arena.declare_var("bump");

        let target = arena.var(counter);
        let zero = arena.int(0);
        let init = arena.assign(target, zero);

        let target = arena.var(counter);
        let read = arena.var(counter);
        let one = arena.int(1);
        let sum = arena.binary(BinaryOp::Add, read, one);
        let increment = arena.assign(target, sum);
        let lambda = arena.lambda(&[], increment);
        let bump_target = arena.var(bump);
        let define = arena.assign(bump_target, lambda);

        let callee = arena.var(bump);
        let first = arena.call(callee, &[]);
        let callee = arena.var(bump);
        let second = arena.call(callee, &[]);
        let result = arena.var(counter);
        let root = arena.block(&[counter, bump], &[init, define, first, second, result]);

        assert_eq!(eval(&arena, root).unwrap(), Value::Int(2));
    }

    #[test]
    fn arity_is_checked() {
        let mut arena = ExprArena::new();
        let x = arena.declare_var("x");
        let body = arena.var(x);
        let lambda = arena.lambda(&[x], body);
        let root = arena.call(lambda, &[]);
        assert!(matches!(
            eval(&arena, root),
            Err(EvalError::ArityMismatch {
                expected: 1,
                got: 0
            })
        ));
    }

    #[test]
    fn calling_a_non_function_fails() {
        let mut arena = ExprArena::new();
        let callee = arena.bool(true);
        let root = arena.call(callee, &[]);
        assert!(matches!(
            eval(&arena, root),
            Err(EvalError::NotCallable { type_name: "bool" })
        ));
    }

    #[test]
    fn unbounded_recursion_hits_call_depth_limit() {
        // { f; f = () => f(); f() }
        let mut arena = ExprArena::new();
        let f = arena.declare_var("f");
        let callee = arena.var(f);
        let recurse = arena.call(callee, &[]);
        let lambda = arena.lambda(&[], recurse);
        let target = arena.var(f);
        let define = arena.assign(target, lambda);
        let callee = arena.var(f);
        let start = arena.call(callee, &[]);
        let root = arena.block(&[f], &[define, start]);

        let constants = ConstantPool::new();
        let config = InterpreterConfig::default().with_max_call_depth(32);
        let mut interpreter = Interpreter::with_config(&arena, &constants, config);
        assert!(matches!(
            interpreter.eval(root),
            Err(EvalError::StackOverflow { limit: 32 })
        ));
        assert_eq!(interpreter.env().depth(), 1);
    }
}

mod exceptions {
    use super::*;
    use pretty_assertions::assert_eq;

    /// `try { throw thrown } catch (e) when filter { handler }`
    fn try_throw(
        arena: &mut ExprArena,
        thrown: i64,
        variable: Option<VarId>,
        filter: Option<ExprId>,
        handler: ExprId,
    ) -> ExprId {
        let value = arena.int(thrown);
        let body = arena.throw(value);
        arena.try_catch(
            body,
            &[CatchHandler {
                variable,
                body: handler,
                filter,
            }],
        )
    }

    #[test]
    fn uncaught_throw_surfaces_value() {
        let mut arena = ExprArena::new();
        let value = arena.int(5);
        let root = arena.throw(value);
        assert!(matches!(eval(&arena, root), Err(EvalError::Thrown(Value::Int(5)))));
    }

    #[test]
    fn handler_binds_thrown_value() {
        let mut arena = ExprArena::new();
        let e = arena.declare_var("e");
        let handler = arena.var(e);
        let root = try_throw(&mut arena, 9, Some(e), None, handler);
        assert_eq!(eval(&arena, root).unwrap(), Value::Int(9));
    }

    #[test]
    fn try_without_throw_yields_body() {
        let mut arena = ExprArena::new();
        let body = arena.int(1);
        let handler_body = arena.int(2);
        let root = arena.try_catch(
            body,
            &[CatchHandler {
                variable: None,
                body: handler_body,
                filter: None,
            }],
        );
        assert_eq!(eval(&arena, root).unwrap(), Value::Int(1));
    }

    #[test]
    fn failing_filter_rethrows() {
        let mut arena = ExprArena::new();
        let filter = arena.bool(false);
        let handler = arena.unit();
        let root = try_throw(&mut arena, 3, None, Some(filter), handler);
        assert!(matches!(eval(&arena, root), Err(EvalError::Thrown(Value::Int(3)))));
    }

    #[test]
    fn first_matching_handler_wins() {
        let mut arena = ExprArena::new();
        let e = arena.declare_var("e");
        let value = arena.int(4);
        let body = arena.throw(value);

        let e_ref = arena.var(e);
        let limit = arena.int(3);
        let small = arena.binary(BinaryOp::Lt, e_ref, limit);
        let small_body = arena.int(1);
        let big_body = arena.int(2);
        let fallback_body = arena.int(3);
        let root = arena.try_catch(
            body,
            &[
                CatchHandler {
                    variable: Some(e),
                    body: small_body,
                    filter: Some(small),
                },
                CatchHandler {
                    variable: None,
                    body: big_body,
                    filter: None,
                },
                CatchHandler {
                    variable: None,
                    body: fallback_body,
                    filter: None,
                },
            ],
        );
        assert_eq!(eval(&arena, root).unwrap(), Value::Int(2));
    }

    #[test]
    fn non_throw_errors_are_not_caught() {
        let mut arena = ExprArena::new();
        let max = arena.int(i64::MAX);
        let one = arena.int(1);
        let body = arena.binary(BinaryOp::Add, max, one);
        let handler_body = arena.unit();
        let root = arena.try_catch(
            body,
            &[CatchHandler {
                variable: None,
                body: handler_body,
                filter: None,
            }],
        );
        assert!(matches!(
            eval(&arena, root),
            Err(EvalError::IntegerOverflow { op: "+" })
        ));
    }
}
