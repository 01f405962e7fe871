//! The tree-walking interpreter.
//!
//! Evaluates one fragment out of an [`ExprArena`], reading constants from a
//! [`ConstantPool`]. Unwinding for `throw` is modelled as
//! [`EvalError::Thrown`] travelling up through `?` until a `try` claims it.

use std::sync::Arc;

use hoist_ir::{ensure_sufficient_stack, CatchRange, ExprArena, ExprId, ExprKind, Member, VarId, VarRange};
use hoist_runtime::{
    merge_runtime_variables, BoxedVariables, Builtin, ConstantPool, FunctionValue, StrongBox, Value,
    VariableList,
};

use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::{evaluate_binary, Environment, InterpreterConfig};

pub struct Interpreter<'a> {
    arena: &'a ExprArena,
    constants: &'a ConstantPool,
    config: InterpreterConfig,
    env: Environment,
    call_depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(arena: &'a ExprArena, constants: &'a ConstantPool) -> Self {
        Self::with_config(arena, constants, InterpreterConfig::default())
    }

    pub fn with_config(arena: &'a ExprArena, constants: &'a ConstantPool, config: InterpreterConfig) -> Self {
        Interpreter {
            arena,
            constants,
            config,
            env: Environment::new(),
            call_depth: 0,
        }
    }

    /// Bind `var` to an existing cell in the outermost scope.
    ///
    /// Lets a host evaluate a fragment against variables it already owns.
    pub fn bind(&mut self, var: VarId, cell: StrongBox) {
        self.env.define(var, cell);
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Evaluate `id`.
    pub fn eval(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(id))
    }

    fn eval_inner(&mut self, id: ExprId) -> EvalResult {
        let arena = self.arena;
        match *arena.kind(id) {
            ExprKind::Unit => Ok(Value::Unit),
            ExprKind::Int(n) => Ok(Value::Int(n)),
            ExprKind::Bool(b) => Ok(Value::Bool(b)),
            ExprKind::Var(var) => Ok(self.lookup(var)?.get()),
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                evaluate_binary(op, &left, &right)
            }
            ExprKind::Assign { target, value } => self.eval_assign(target, value),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_bool(cond)? {
                    self.eval(then_branch)
                } else {
                    self.eval(else_branch)
                }
            }
            ExprKind::Block { locals, body } => self.with_scope(|this| {
                for &var in arena.var_list(locals) {
                    this.env.define(var, StrongBox::default());
                }
                let mut last = Value::Unit;
                for &expr in arena.expr_list(body) {
                    last = this.eval(expr)?;
                }
                Ok(last)
            }),
            ExprKind::Lambda { params, body, name } => {
                Ok(Value::Function(Arc::new(FunctionValue {
                    name,
                    params: Arc::from(arena.var_list(params)),
                    body,
                    captures: self.env.capture(),
                })))
            }
            ExprKind::Call { callee, args } => {
                let callee = self.eval(callee)?;
                let args = arena
                    .expr_list(args)
                    .iter()
                    .map(|&arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(callee, args)
            }
            ExprKind::Try { body, handlers } => match self.eval(body) {
                Err(EvalError::Thrown(thrown)) => self.handle(handlers, thrown),
                other => other,
            },
            ExprKind::Throw(value) => Err(EvalError::Thrown(self.eval(value)?)),
            ExprKind::Constant(constant) => Ok(self.constants.get(constant).clone()),
            ExprKind::Field {
                receiver,
                member: Member::Value,
            } => Ok(self.eval_cell(receiver)?.get()),
            ExprKind::RuntimeVariables(vars) => Ok(Value::Variables(self.materialize(vars)?)),
        }
    }

    /// Run `f` in a fresh scope, popping it on every exit path.
    fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, EvalError>) -> Result<T, EvalError> {
        let depth = self.env.depth();
        self.env.push_scope();
        let result = f(self);
        self.env.pop_scope();
        debug_assert_eq!(self.env.depth(), depth, "scope left open");
        result
    }

    fn lookup(&self, var: VarId) -> Result<StrongBox, EvalError> {
        self.env
            .lookup(var)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable {
                name: self.arena.var_name(var).to_owned(),
            })
    }

    fn eval_bool(&mut self, id: ExprId) -> Result<bool, EvalError> {
        match self.eval(id)? {
            Value::Bool(b) => Ok(b),
            other => Err(type_mismatch("bool", &other)),
        }
    }

    fn eval_cell(&mut self, id: ExprId) -> Result<StrongBox, EvalError> {
        match self.eval(id)? {
            Value::Cell(cell) => Ok(cell),
            other => Err(type_mismatch("cell", &other)),
        }
    }

    /// `target = value`: the value is evaluated first, then the target's
    /// receiver. Yields the assigned value.
    fn eval_assign(&mut self, target: ExprId, value: ExprId) -> EvalResult {
        let value = self.eval(value)?;
        let cell = match *self.arena.kind(target) {
            ExprKind::Var(var) => self.lookup(var)?,
            ExprKind::Field {
                receiver,
                member: Member::Value,
            } => self.eval_cell(receiver)?,
            _ => return Err(EvalError::InvalidAssignmentTarget),
        };
        cell.set(value.clone());
        Ok(value)
    }

    /// A list over the cells currently bound to `vars`, in order.
    fn materialize(&self, vars: VarRange) -> Result<VariableList, EvalError> {
        let cells = self
            .arena
            .var_list(vars)
            .iter()
            .map(|&var| self.lookup(var))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(BoxedVariables::new(cells)))
    }

    /// Try each handler in order against a thrown value.
    ///
    /// A handler matches when it has no filter or its filter evaluates to
    /// `true`. No match rethrows the original value.
    fn handle(&mut self, handlers: CatchRange, thrown: Value) -> EvalResult {
        let arena = self.arena;
        for handler in arena.catches(handlers) {
            let outcome = self.with_scope(|this| {
                if let Some(var) = handler.variable {
                    this.env.define(var, StrongBox::new(thrown.clone()));
                }
                if let Some(filter) = handler.filter {
                    if !this.eval_bool(filter)? {
                        return Ok(None);
                    }
                }
                this.eval(handler.body).map(Some)
            })?;
            if let Some(value) = outcome {
                return Ok(value);
            }
        }
        Err(EvalError::Thrown(thrown))
    }

    fn call(&mut self, callee: Value, args: Vec<Value>) -> EvalResult {
        match callee {
            Value::Function(function) => self.call_function(&function, args),
            Value::Builtin(builtin) => call_builtin(builtin, args),
            other => Err(EvalError::NotCallable {
                type_name: other.type_name(),
            }),
        }
    }

    fn call_function(&mut self, function: &FunctionValue, args: Vec<Value>) -> EvalResult {
        if args.len() != function.params.len() {
            return Err(EvalError::ArityMismatch {
                expected: function.params.len(),
                got: args.len(),
            });
        }
        if self.call_depth >= self.config.max_call_depth {
            return Err(EvalError::StackOverflow {
                limit: self.config.max_call_depth,
            });
        }

        let mut env = Environment::from_captures(&function.captures);
        env.push_scope();
        for (&param, arg) in function.params.iter().zip(args) {
            env.define(param, StrongBox::new(arg));
        }

        tracing::trace!(
            function = function.name.map(|name| self.arena.var_name(name)),
            depth = self.call_depth,
            "call"
        );

        let caller_env = std::mem::replace(&mut self.env, env);
        self.call_depth = self.call_depth.saturating_add(1);
        let result = self.eval(function.body);
        self.call_depth = self.call_depth.saturating_sub(1);
        self.env = caller_env;
        result
    }
}

fn call_builtin(builtin: Builtin, args: Vec<Value>) -> EvalResult {
    match builtin {
        Builtin::MergeRuntimeVariables => {
            let [first, second, routing]: [Value; 3] =
                args.try_into().map_err(|args: Vec<Value>| EvalError::ArityMismatch {
                    expected: builtin.arity(),
                    got: args.len(),
                })?;
            let first = expect_variables(first)?;
            let second = expect_variables(second)?;
            let Value::Routing(routing) = routing else {
                return Err(type_mismatch("routing table", &routing));
            };
            tracing::trace!(
                first = first.count(),
                second = second.count(),
                "merging runtime variables"
            );
            Ok(Value::Variables(merge_runtime_variables(first, second, routing)))
        }
    }
}

fn expect_variables(value: Value) -> Result<VariableList, EvalError> {
    match value {
        Value::Variables(list) => Ok(list),
        other => Err(type_mismatch("runtime variables", &other)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
