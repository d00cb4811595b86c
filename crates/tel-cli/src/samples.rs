use serde_json::{json, Value};

/// Patient records used when no config file supplies its own.
pub fn patient_records() -> Vec<Value> {
    vec![
        json!({
            "patient_id": "654321",
            "name": "Bobby Mahoney",
            "age": 40,
            "medical_history": "None",
            "prescription": "Ibuprofen 200mg",
            "lab_results": "Blood test normal",
            "timestamp": "2025-07-20",
        }),
        json!({
            "patient_id": "635221",
            "name": "Gertruda Gray",
            "age": 30,
            "medical_history": "Asthma",
            "prescription": "Albuterol Inhaler",
            "lab_results": "Blood test normal",
            "timestamp": "2025-07-21",
        }),
        json!({
            "patient_id": "789012",
            "name": "Fatima Forrow",
            "age": 50,
            "medical_history": "Diabetes",
            "prescription": "Metformin",
            "lab_results": "Blood sugar normal",
            "timestamp": "2025-07-22",
        }),
        json!({
            "patient_id": "890123",
            "name": "Larry Lawrence",
            "age": 45,
            "medical_history": "Hypertension",
            "prescription": "Lisinopril",
            "lab_results": "Blood pressure normal",
            "timestamp": "2025-07-23",
        }),
        json!({
            "patient_id": "901234",
            "name": "Samuel Chadwick",
            "age": 35,
            "medical_history": "Allergies",
            "prescription": "Cetirizine",
            "lab_results": "Allergy test positive",
            "timestamp": "2025-07-24",
        }),
    ]
}
