use serde::{Deserialize, Serialize};

/// Raw classifier output. Signed so that out-of-range ids stay representable.
pub type CategoryId = i64;

pub const UNKNOWN_LABEL: &str = "Unknown";

/// The fixed set of job categories the classifier was trained on.
/// Discriminants are the classifier's label ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Advocate = 0,
    Arts = 1,
    AutomationTesting = 2,
    Blockchain = 3,
    BusinessAnalyst = 4,
    CivilEngineer = 5,
    DataScience = 6,
    Database = 7,
    DevOpsEngineer = 8,
    DotNetDeveloper = 9,
    EtlDeveloper = 10,
    ElectricalEngineering = 11,
    Hr = 12,
    Hadoop = 13,
    HealthAndFitness = 14,
    JavaDeveloper = 15,
    MechanicalEngineer = 16,
    NetworkSecurityEngineer = 17,
    OperationsManager = 18,
    Pmo = 19,
    PythonDeveloper = 20,
    SapDeveloper = 21,
    Sales = 22,
    Testing = 23,
    WebDesigning = 24,
}

impl Category {
    pub const ALL: [Category; 25] = [
        Category::Advocate,
        Category::Arts,
        Category::AutomationTesting,
        Category::Blockchain,
        Category::BusinessAnalyst,
        Category::CivilEngineer,
        Category::DataScience,
        Category::Database,
        Category::DevOpsEngineer,
        Category::DotNetDeveloper,
        Category::EtlDeveloper,
        Category::ElectricalEngineering,
        Category::Hr,
        Category::Hadoop,
        Category::HealthAndFitness,
        Category::JavaDeveloper,
        Category::MechanicalEngineer,
        Category::NetworkSecurityEngineer,
        Category::OperationsManager,
        Category::Pmo,
        Category::PythonDeveloper,
        Category::SapDeveloper,
        Category::Sales,
        Category::Testing,
        Category::WebDesigning,
    ];

    pub fn from_id(id: CategoryId) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    #[cfg(test)]
    pub fn id(self) -> CategoryId {
        self as CategoryId
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Advocate => "Advocate",
            Category::Arts => "Arts",
            Category::AutomationTesting => "Automation Testing",
            Category::Blockchain => "Blockchain",
            Category::BusinessAnalyst => "Business Analyst",
            Category::CivilEngineer => "Civil Engineer",
            Category::DataScience => "Data Science",
            Category::Database => "Database",
            Category::DevOpsEngineer => "DevOps Engineer",
            Category::DotNetDeveloper => "DotNet Developer",
            Category::EtlDeveloper => "ETL Developer",
            Category::ElectricalEngineering => "Electrical Engineering",
            Category::Hr => "HR",
            Category::Hadoop => "Hadoop",
            Category::HealthAndFitness => "Health and fitness",
            Category::JavaDeveloper => "Java Developer",
            Category::MechanicalEngineer => "Mechanical Engineer",
            Category::NetworkSecurityEngineer => "Network Security Engineer",
            Category::OperationsManager => "Operations Manager",
            Category::Pmo => "PMO",
            Category::PythonDeveloper => "Python Developer",
            Category::SapDeveloper => "SAP Developer",
            Category::Sales => "Sales",
            Category::Testing => "Testing",
            Category::WebDesigning => "Web Designing",
        }
    }
}

/// Total lookup: any id outside the table resolves to "Unknown".
pub fn resolve(id: CategoryId) -> &'static str {
    match Category::from_id(id) {
        Some(category) => category.label(),
        None => UNKNOWN_LABEL,
    }
}
