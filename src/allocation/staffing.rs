use crate::catalog::NameCatalogs;
use crate::config::Bounds;
use crate::context::GenerationContext;
use crate::model::{Assignment, Employee, Operation};
use crate::persistence::{StaffLookup, StoreResult};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Staffs an operation with a few of its resource's active employees.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentAllocator {
    per_operation: Bounds<usize>,
    capacity_pct: Bounds<f64>,
}

impl Default for AssignmentAllocator {
    fn default() -> Self {
        Self::new(Bounds::new(1, 3), Bounds::new(25.0, 100.0))
    }
}

impl AssignmentAllocator {
    pub fn new(per_operation: Bounds<usize>, capacity_pct: Bounds<f64>) -> Self {
        Self {
            per_operation,
            capacity_pct,
        }
    }

    /// Looks up the active staff of the operation's resource and assigns from it.
    /// An unstaffed resource yields no assignments.
    pub fn allocate<S, R>(
        &self,
        staff: &S,
        operation: &Operation,
        ctx: &mut GenerationContext,
        rng: &mut R,
    ) -> StoreResult<Vec<Assignment>>
    where
        S: StaffLookup + ?Sized,
        R: Rng + ?Sized,
    {
        let employees = staff.active_employees(operation.resource_id)?;
        Ok(self.assign(&employees, operation, ctx, rng))
    }

    /// Picks `min(random(per_operation), eligible)` distinct employees. Only
    /// active employees of the operation's resource are eligible. Capacity
    /// shares are drawn independently per assignment and never normalized
    /// across an employee's other work.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        employees: &[Employee],
        operation: &Operation,
        ctx: &mut GenerationContext,
        rng: &mut R,
    ) -> Vec<Assignment> {
        let eligible: Vec<&Employee> = employees
            .iter()
            .filter(|e| e.active && e.resource_id == Some(operation.resource_id))
            .collect();
        if eligible.is_empty() {
            return Vec::new();
        }

        let wanted = rng
            .random_range(self.per_operation.min..=self.per_operation.max)
            .min(eligible.len());
        let chosen: Vec<&Employee> = eligible.choose_multiple(rng, wanted).copied().collect();

        chosen
            .into_iter()
            .map(|employee| Assignment {
                id: ctx.next_assignment_id(),
                operation_id: operation.id,
                employee_id: employee.id,
                role: NameCatalogs::role(rng).to_string(),
                capacity_pct: rng.random_range(self.capacity_pct.min..=self.capacity_pct.max),
            })
            .collect()
    }
}
