pub mod category;
pub mod portfolio;
pub mod project;
pub mod section;
pub mod section_content;
pub mod user;

pub use category::{Category, CategoryWithProjects, NewCategory};
pub use portfolio::{NewPortfolio, Portfolio, PortfolioWithRelations};
pub use project::{NewProject, Project};
pub use section::{NewSection, Section, SectionWithContents};
pub use section_content::{ContentType, NewSectionContent, SectionContent};
pub use user::{NewUser, User};
