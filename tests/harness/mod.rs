// tests/harness/mod.rs
//! Test harness for end-to-end compiler tests
//!
//! Provides a reference interpreter for the stack machine targeted by the
//! code generator, so tests can check what compiled programs compute rather
//! than how their code is laid out.
//!
//! Memory is a single array of `memsize` words. The stack starts at the top
//! and grows down; the heap starts at address 0 and grows up.

#![allow(dead_code)]

use fool::prelude::*;
use rustc_hash::FxHashMap;

/// Upper bound on executed instructions before a run is considered stuck.
const STEP_LIMIT: usize = 1_000_000;

/// Why the machine stopped without reaching `halt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineError {
    DivisionByZero { ip: usize },
    AddressOutOfRange { ip: usize, address: i64 },
    StackOverflow { ip: usize },
    InvalidJump { ip: usize, target: i64 },
    UnplacedLabel(Label),
    StepLimit,
}

/// Observable outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Top of stack at `halt`, if the stack was not empty.
    pub result: Option<i64>,
    /// Every value printed, in order.
    pub output: Vec<i64>,
}

/// The stack machine.
pub struct Machine {
    code: Vec<Instruction>,
    labels: FxHashMap<Label, usize>,
    memory: Vec<i64>,
    ip: usize,
    sp: i64,
    fp: i64,
    hp: i64,
    ra: i64,
    tm: i64,
    output: Vec<i64>,
}

impl Machine {
    /// Load a code unit, resolving every label to the index of the
    /// instruction that follows it.
    pub fn load(unit: &CodeUnit, memsize: i64) -> Self {
        let mut code = Vec::with_capacity(unit.len());
        let mut labels = FxHashMap::default();
        for instruction in unit.instructions() {
            match instruction {
                Instruction::Label(label) => {
                    labels.insert(*label, code.len());
                }
                other => code.push(*other),
            }
        }

        Self {
            code,
            labels,
            memory: vec![0; memsize as usize],
            ip: 0,
            sp: memsize,
            fp: memsize,
            hp: 0,
            ra: 0,
            tm: 0,
            output: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<Execution, MachineError> {
        for _ in 0..STEP_LIMIT {
            let Some(instruction) = self.code.get(self.ip).copied() else {
                return Err(MachineError::InvalidJump {
                    ip: self.ip,
                    target: self.ip as i64,
                });
            };
            let at = self.ip;
            self.ip += 1;

            match instruction {
                Instruction::Push(value) => self.push(value, at)?,
                Instruction::PushLabel(label) => {
                    let target = self.resolve(label)?;
                    self.push(target as i64, at)?;
                }
                Instruction::Pop => {
                    self.pop(at)?;
                }
                Instruction::Add => self.binary(at, |l, r| Ok(l + r))?,
                Instruction::Sub => self.binary(at, |l, r| Ok(l - r))?,
                Instruction::Mult => self.binary(at, |l, r| Ok(l * r))?,
                Instruction::Div => self.binary(at, |l, r| {
                    if r == 0 {
                        Err(MachineError::DivisionByZero { ip: at })
                    } else {
                        Ok(l / r)
                    }
                })?,
                Instruction::Branch(label) => self.ip = self.resolve(label)?,
                Instruction::BranchEqual(label) => {
                    let v1 = self.pop(at)?;
                    let v2 = self.pop(at)?;
                    if v1 == v2 {
                        self.ip = self.resolve(label)?;
                    }
                }
                Instruction::BranchLessEqual(label) => {
                    let v1 = self.pop(at)?;
                    let v2 = self.pop(at)?;
                    if v2 <= v1 {
                        self.ip = self.resolve(label)?;
                    }
                }
                Instruction::JumpSubroutine => {
                    let target = self.pop(at)?;
                    self.ra = self.ip as i64;
                    self.jump(target, at)?;
                }
                Instruction::Label(_) => {}
                Instruction::LoadFp => self.push(self.fp, at)?,
                Instruction::StoreFp => self.fp = self.pop(at)?,
                Instruction::CopyFp => self.fp = self.sp,
                Instruction::LoadRa => self.push(self.ra, at)?,
                Instruction::StoreRa => self.ra = self.pop(at)?,
                Instruction::LoadTm => self.push(self.tm, at)?,
                Instruction::StoreTm => self.tm = self.pop(at)?,
                Instruction::LoadHp => self.push(self.hp, at)?,
                Instruction::StoreHp => self.hp = self.pop(at)?,
                Instruction::LoadWord => {
                    let address = self.pop(at)?;
                    let value = self.read(address, at)?;
                    self.push(value, at)?;
                }
                Instruction::StoreWord => {
                    let address = self.pop(at)?;
                    let value = self.pop(at)?;
                    self.write(address, value, at)?;
                }
                Instruction::Print => {
                    let top = self.read(self.sp, at)?;
                    self.output.push(top);
                }
                Instruction::Halt => {
                    let result = if (self.sp as usize) < self.memory.len() {
                        Some(self.memory[self.sp as usize])
                    } else {
                        None
                    };
                    return Ok(Execution {
                        result,
                        output: self.output,
                    });
                }
            }
        }
        Err(MachineError::StepLimit)
    }

    fn resolve(&self, label: Label) -> Result<usize, MachineError> {
        self.labels
            .get(&label)
            .copied()
            .ok_or(MachineError::UnplacedLabel(label))
    }

    fn jump(&mut self, target: i64, at: usize) -> Result<(), MachineError> {
        if target < 0 || target as usize >= self.code.len() {
            return Err(MachineError::InvalidJump { ip: at, target });
        }
        self.ip = target as usize;
        Ok(())
    }

    fn push(&mut self, value: i64, at: usize) -> Result<(), MachineError> {
        if self.sp - 1 < self.hp {
            return Err(MachineError::StackOverflow { ip: at });
        }
        self.sp -= 1;
        self.write(self.sp, value, at)
    }

    fn pop(&mut self, at: usize) -> Result<i64, MachineError> {
        let value = self.read(self.sp, at)?;
        self.sp += 1;
        Ok(value)
    }

    /// Pop `v1`, then `v2`, and push `op(v2, v1)`.
    fn binary(
        &mut self,
        at: usize,
        op: impl FnOnce(i64, i64) -> Result<i64, MachineError>,
    ) -> Result<(), MachineError> {
        let v1 = self.pop(at)?;
        let v2 = self.pop(at)?;
        let result = op(v2, v1)?;
        self.push(result, at)
    }

    fn read(&self, address: i64, at: usize) -> Result<i64, MachineError> {
        usize::try_from(address)
            .ok()
            .and_then(|index| self.memory.get(index).copied())
            .ok_or(MachineError::AddressOutOfRange { ip: at, address })
    }

    fn write(&mut self, address: i64, value: i64, at: usize) -> Result<(), MachineError> {
        let slot = usize::try_from(address)
            .ok()
            .and_then(|index| self.memory.get_mut(index))
            .ok_or(MachineError::AddressOutOfRange { ip: at, address })?;
        *slot = value;
        Ok(())
    }
}

/// Execute a code unit compiled for a machine of `memsize` words.
pub fn execute(unit: &CodeUnit, memsize: i64) -> Result<Execution, MachineError> {
    Machine::load(unit, memsize).run()
}

/// Compile with default options and execute, panicking on any failure.
pub fn run(program: &Program<'_>) -> Execution {
    let compiled = compile(program).unwrap_or_else(|e| panic!("compilation failed: {e}"));
    execute(&compiled.code, DEFAULT_MEMSIZE)
        .unwrap_or_else(|e| panic!("execution failed: {e:?}\n{}", compiled.code))
}

/// Compile and execute, returning the program's result.
pub fn result_of(program: &Program<'_>) -> i64 {
    run(program)
        .result
        .unwrap_or_else(|| panic!("program left an empty stack"))
}

/// Compile and return the semantic errors, panicking if compilation succeeds.
pub fn errors_of(program: &Program<'_>) -> CompilationErrors {
    match compile(program) {
        Ok(compiled) => panic!("expected errors, got:\n{}", compiled.code),
        Err(FoolError::Semantic(errors)) => errors,
        Err(other) => panic!("expected semantic errors, got {other}"),
    }
}
