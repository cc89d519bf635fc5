use anyhow::{Context, Result};
use log::info;
use serde_json::json;

use roster::utils::db_inspector::DbInspector;
use roster::{
    Database, DatabaseConfig, DepartmentRepository, EmployeeRepository, ReviewRepository,
};

fn main() -> Result<()> {
    // Set up logging
    env_logger::init();
    info!("Starting roster...");

    let config = DatabaseConfig::from_env()?;
    let database = Database::new(&config)?;
    database.create_tables()?;

    let departments = database.department_repository();
    let employees = database.employee_repository();
    let reviews = database.review_repository();

    // Seed a small company on first run
    if departments.get_all()?.is_empty() {
        info!("No departments found. Seeding sample data...");
        let payroll = departments.create("Payroll", "Building A, 5th Floor")?;
        let hr = departments.create("Human Resources", "Building C, East Wing")?;

        let payroll_id = payroll.borrow().id().context("saved department has no id")?;
        let hr_id = hr.borrow().id().context("saved department has no id")?;

        let amir = employees.create("Amir", "Accountant", payroll_id)?;
        employees.create("Bola", "Manager", payroll_id)?;
        employees.create("Charlie", "Manager", hr_id)?;

        let amir_id = amir.borrow().id().context("saved employee has no id")?;
        reviews.create(2023, "Efficient worker", amir_id)?;
    }

    let mut listing = Vec::new();
    for department in departments.get_all()? {
        let staff = database.employees_of(&department)?;
        let mut staff_json = Vec::with_capacity(staff.len());
        for employee in &staff {
            let employee_reviews = database.reviews_of(employee)?;
            let review_json: Vec<_> = employee_reviews
                .iter()
                .map(|review| serde_json::to_value(&*review.borrow()))
                .collect::<Result<_, _>>()?;
            staff_json.push(json!({
                "employee": serde_json::to_value(&*employee.borrow())?,
                "reviews": review_json,
            }));
        }
        listing.push(json!({
            "department": serde_json::to_value(&*department.borrow())?,
            "employees": staff_json,
        }));
    }

    println!("{}", serde_json::to_string_pretty(&listing)?);

    DbInspector::new(database.pool().clone()).print_database_report()?;
    Ok(())
}
