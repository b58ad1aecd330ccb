use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CONTACT_RE: Regex =
        Regex::new(r"(?i)email|phone|@|linkedin|github|contact").unwrap();
    static ref EXPERIENCE_RE: Regex =
        Regex::new(r"(?i)experience|work|employment|position|role|job|company|intern").unwrap();
    static ref EDUCATION_RE: Regex =
        Regex::new(r"(?i)education|university|college|degree|bachelor|master|school|gpa|major")
            .unwrap();
    static ref SKILLS_RE: Regex = Regex::new(
        r"(?i)skills|technologies|tools|expertise|proficient|languages|programming|technical"
    )
    .unwrap();
    static ref PROJECTS_RE: Regex =
        Regex::new(r"(?i)project|portfolio|github|built|developed|created|implemented").unwrap();
    static ref PORTFOLIO_RE: Regex =
        Regex::new(r"(?i)github\.com|linkedin\.com|portfolio|behance|dribbble").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    pub has_contact: bool,
    pub has_experience: bool,
    pub has_education: bool,
    pub has_skills: bool,
    pub has_projects: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub sections: Sections,
}

/// Heuristic section check over extracted resume text. The verdict is
/// advisory: warnings are surfaced to the caller as tips and never block
/// the upload. Projects count as a substitute for formal experience so
/// entry-level resumes are not penalized.
pub fn validate_resume(text: &str) -> ValidationVerdict {
    let mut warnings = Vec::new();

    let sections = Sections {
        has_contact: CONTACT_RE.is_match(text),
        has_experience: EXPERIENCE_RE.is_match(text),
        has_education: EDUCATION_RE.is_match(text),
        has_skills: SKILLS_RE.is_match(text),
        has_projects: PROJECTS_RE.is_match(text),
    };

    if !sections.has_contact {
        warnings.push("Consider adding contact information (email, phone, LinkedIn)".into());
    }
    if !sections.has_experience && !sections.has_projects {
        warnings.push(
            "Add work experience, internships, or personal/academic projects to showcase \
             your abilities"
                .into(),
        );
    }
    if !sections.has_education {
        warnings.push("Include your education details (degree, major, GPA if above 3.0)".into());
    }
    if !sections.has_skills {
        warnings.push("Add a skills section to highlight your technical and soft skills".into());
    }

    if !sections.has_projects
        && text.to_lowercase().contains("student")
        && !sections.has_experience
    {
        warnings.push(
            "TIP: Academic projects, hackathons, and personal projects are valuable for \
             your resume"
                .into(),
        );
    }

    if !PORTFOLIO_RE.is_match(text) {
        warnings.push("TIP: Add links to your GitHub, LinkedIn, or portfolio to stand out".into());
    }

    let has_relevant_experience = sections.has_experience || sections.has_projects;
    let is_valid = sections.has_education && (has_relevant_experience || sections.has_skills);

    if !is_valid {
        warnings.push(
            "Your resume should include: Education + (Experience/Projects or Skills). \
             As a student or entry-level candidate, academic projects and coursework \
             are valuable!"
                .into(),
        );
    }

    ValidationVerdict {
        is_valid,
        warnings,
        sections,
    }
}
