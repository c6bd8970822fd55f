use serde::{Deserialize, Serialize};

/// Doctor record carried inside a `doctors` reply part. The backend omits
/// whatever a record lacks, so every field is optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub name: Option<String>,
    pub degree: Option<String>,
    pub speciality: Option<String>,
    pub hospital_name: Option<String>,
    pub number: Option<String>,
}

pub const DOCTOR_LIST_HEADER: &str = "Here are some recommended doctors:\n\n";

/// Renders a batch of recommendations as one numbered text block. Missing
/// fields show as `N/A`, except the degree line which stays blank.
pub fn format_doctor_list(doctors: &[DoctorSummary]) -> String {
    let mut text = String::from(DOCTOR_LIST_HEADER);
    for (index, doctor) in doctors.iter().enumerate() {
        text.push_str(&format!(
            "{}. **{}**\n   {}\n   Specialty: {}\n   Hospital: {}\n   Phone: {}\n\n",
            index + 1,
            doctor.name.as_deref().unwrap_or("N/A"),
            doctor.degree.as_deref().unwrap_or(""),
            doctor.speciality.as_deref().unwrap_or("N/A"),
            doctor.hospital_name.as_deref().unwrap_or("N/A"),
            doctor.number.as_deref().unwrap_or("N/A"),
        ));
    }
    text
}
