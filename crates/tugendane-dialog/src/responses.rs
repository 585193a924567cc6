//! Localized response texts.
//!
//! Every user-facing string lives here, in English and Kinyarwanda. The
//! engine composes replies from these helpers so wording stays in one place.

use tugendane_core::{Language, Service, ServiceCategory};
use tugendane_geo::ServiceHit;

pub fn greeting(language: Language) -> String {
    match language {
        Language::En => "Hello! I can help you find nearby government services. Please describe what you need (example: 'I need a health clinic').".to_string(),
        Language::Rw => "Muraho! Ndagufasha gushaka serivisi za guverinoma hafi yawe. Sobanura icyo ukeneye (urugero: 'ndashaka ivuriro').".to_string(),
    }
}

pub fn help(language: Language) -> String {
    match language {
        Language::En => "Here are some ways you can use Tugendane:\n\n\
1. Find a service: \"I need a health clinic nearby\"\n\
2. Get directions: \"Directions to the sector office\"\n\
3. Check hours: \"When is the ministry open?\"\n\
4. Required documents: \"What documents do I need for a passport?\"\n\n\
You can send your SMS in either English or Kinyarwanda."
            .to_string(),
        Language::Rw => "Ubu ni bumwe mu buryo wakoresha Tugendane:\n\n\
1. Gushaka serivisi: \"Ndashaka ivuriro hafi\"\n\
2. Kubona inzira: \"Amabwiriza yo kujya ku biro by'umurenge\"\n\
3. Gusesengura amasaha: \"Ni ryari minisiteri ifungurwa?\"\n\
4. Impapuro zisabwa: \"Ni ibihe byangombwa bisabwa kubona passport?\"\n\n\
Shyiramo SMS yawe mu rurimi urwo aricyo cyose (Icyongereza cyangwa Ikinyarwanda)."
            .to_string(),
    }
}

pub fn need_location(language: Language) -> String {
    match language {
        Language::En => "To find services, I need to know your location. Please provide a location name (example: 'Kigali').".to_string(),
        Language::Rw => "Kugirango nkubone serivisi, nahitaji kumenya aho uherereye. Nyamuneka, tanga izina ry'aho uherereye (urugero: 'Kigali').".to_string(),
    }
}

pub fn location_not_found(language: Language, place: &str) -> String {
    match language {
        Language::En => format!("I couldn't find the location {}. Please try another.", place),
        Language::Rw => format!("Sinabashije kubona aho {} iherereye. Gerageza indi.", place),
    }
}

/// Numbered listing of candidate services plus the selection prompt.
pub fn service_list(language: Language, category: Option<ServiceCategory>, hits: &[ServiceHit]) -> String {
    let mut message = match language {
        Language::En => format!(
            "Found {} {} services near you:\n\n",
            hits.len(),
            category.map(|c| c.to_string()).unwrap_or_else(|| "government".to_string())
        ),
        Language::Rw => format!(
            "Nabonye serivisi {} za {} hafi yawe:\n\n",
            hits.len(),
            category.map(|c| c.to_string()).unwrap_or_else(|| "guverinoma".to_string())
        ),
    };

    for (i, hit) in hits.iter().enumerate() {
        let service = &hit.service;
        message.push_str(&format!(
            "{}. {} ({:.1} km)\n",
            i + 1,
            service.name,
            hit.distance_km
        ));
        let (address_label, hours_label, phone_label) = match language {
            Language::En => ("Address", "Hours", "Phone"),
            Language::Rw => ("Aho Iherereye", "Amasaha", "Telefone"),
        };
        if let Some(address) = &service.address {
            message.push_str(&format!("   {}: {}\n", address_label, address));
        }
        if let Some(hours) = &service.hours {
            message.push_str(&format!("   {}: {}\n", hours_label, hours));
        }
        if let Some(phone) = &service.phone {
            message.push_str(&format!("   {}: {}\n", phone_label, phone));
        }
        message.push('\n');
    }

    message.push_str(match language {
        Language::En => "Enter the number of the service you want directions to (example: '1').",
        Language::Rw => "Shyiramo nomero ya serivisi ukeneye amabwiriza yo kuyigeraho (urugero: '1').",
    });
    message
}

pub fn no_services(language: Language) -> String {
    match language {
        Language::En => "I couldn't find any services matching your request. Please try again.".to_string(),
        Language::Rw => "Ntinabonereza serivisi ijyanye nicyo ushaka. Gerageza ubundi.".to_string(),
    }
}

pub fn no_services_of_type(language: Language, category: Option<ServiceCategory>) -> String {
    match language {
        Language::En => format!(
            "I couldn't find any {} near you. Please try again.",
            category.map(|c| format!("{} services", c)).unwrap_or_else(|| "services".to_string())
        ),
        Language::Rw => format!(
            "Sinabonye {} hafi yawe. Gerageza indi.",
            category.map(|c| format!("serivisi za {}", c)).unwrap_or_else(|| "serivisi".to_string())
        ),
    }
}

pub fn select_by_number(language: Language) -> String {
    match language {
        Language::En => "Please select a service by number (1, 2, ...). Enter just the number.".to_string(),
        Language::Rw => "Nyamuneka, hitamo serivisi ukoresheje nomero (1, 2, ...). Shyiramo gusa nomero.".to_string(),
    }
}

pub fn need_service_type(language: Language) -> String {
    match language {
        Language::En => "I didn't understand what type of service you need. Try something like: 'Directions to the Kigali hospital'.".to_string(),
        Language::Rw => "Ntimvuze neza ubuhe bwoko bwa serivisi ushaka. Gerageza urugero: 'Amabwiriza yo kujya ku bitaro bya Kigali'.".to_string(),
    }
}

pub fn directions_preamble(language: Language, service_name: &str, distance_km: f64) -> String {
    match language {
        Language::En => format!("Directions to {} ({:.1} km):\n\n", service_name, distance_km),
        Language::Rw => format!("Amabwiriza yo kugera kuri {} ({:.1} km):\n\n", service_name, distance_km),
    }
}

pub fn service_hours(language: Language, service: &Service) -> String {
    match (&service.hours, language) {
        (Some(hours), Language::En) => format!("Opening hours for {}:\n{}", service.name, hours),
        (Some(hours), Language::Rw) => format!("Amasaha ya {}:\n{}", service.name, hours),
        (None, Language::En) => format!(
            "Sorry, no information available about opening hours for {}.",
            service.name
        ),
        (None, Language::Rw) => format!(
            "Mbabarira, ntamakuru afite kuri amasaha ya {}.",
            service.name
        ),
    }
}

pub fn required_documents(language: Language, service: &Service) -> String {
    match (&service.required_documents, language) {
        (Some(docs), Language::En) => format!("Required documents for {}:\n{}", service.name, docs),
        (Some(docs), Language::Rw) => format!("Impapuro zisabwa kuri {}:\n{}", service.name, docs),
        (None, Language::En) => format!(
            "Sorry, no information available about required documents for {}.",
            service.name
        ),
        (None, Language::Rw) => format!(
            "Mbabarira, ntamakuru afite ku mpapuro zisabwa kuri {}.",
            service.name
        ),
    }
}

pub fn need_service_info(language: Language) -> String {
    match language {
        Language::En => "To check service information, I need to know what type of service and your location.".to_string(),
        Language::Rw => "Kugirango ndebe amakuru yiyi serivisi, nahitaji kumenya ubuhe bwoko bwa serivisi n'aho uherereye.".to_string(),
    }
}

pub fn call_unavailable(language: Language) -> String {
    match language {
        Language::En => "Sorry, connecting calls to services is not available on this channel.".to_string(),
        Language::Rw => "Mbabarira, guhuza uwatakumbusa na serivisi bidashoboka kuri ubu.".to_string(),
    }
}

/// Voice prompt offering directions or a bridged call for one candidate.
pub fn voice_confirmation(language: Language, service_name: &str) -> String {
    match language {
        Language::En => format!(
            "We found {} near you. Press 1 for directions, or press 2 to be connected by phone.",
            service_name
        ),
        Language::Rw => format!(
            "Twabonye {} hafi yawe. Kanda 1 kubona amabwiriza, cyangwa ukande 2 guhuzwa kuri telefone.",
            service_name
        ),
    }
}

pub fn connecting_call(language: Language, service_name: &str) -> String {
    match language {
        Language::En => format!("Connecting you to {}. Please hold.", service_name),
        Language::Rw => format!("Turaguhuza na {}. Tegereza gato.", service_name),
    }
}

pub fn follow_up_question(language: Language, service_name: &str) -> String {
    match language {
        Language::En => format!(
            "Hello from Tugendane! Did you receive the service you were looking for at {}? Please reply with YES or NO.",
            service_name
        ),
        Language::Rw => format!(
            "Mwaramutse Tugendane! Wabonye serivisi wari gushaka kuri {}? Subiza YEGO cyangwa OYA.",
            service_name
        ),
    }
}

pub fn thanks_confirmed(language: Language) -> String {
    match language {
        Language::En => "Thank you! We're glad you received the service successfully.".to_string(),
        Language::Rw => "Murakoze! Twishimye ko wabonye serivisi yawe neza.".to_string(),
    }
}

pub fn thanks_issue(language: Language) -> String {
    match language {
        Language::En => "We're sorry you encountered issues! We'll follow up on this.".to_string(),
        Language::Rw => "Mbabarira ko wabonye ibibazo! Turaza gukurikirana iki kibazo.".to_string(),
    }
}

pub fn default_reply(language: Language) -> String {
    match language {
        Language::En => "Sorry, I didn't understand what you're looking for. I can help you find government services, provide directions, and more. Please provide more details, or type 'HELP' to see a list of instructions.".to_string(),
        Language::Rw => "Mbabarira, sinumvise neza icyo ushaka. Nshobora kugufasha gushaka serivisi za guverinoma, gutanga amabwiriza, n'ibindi. Tanga andi makuru, cyangwa andika 'HELP' kugirango ubone urutonde rw'amabwiriza.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tugendane_core::GeoPoint;

    fn hit(name: &str, distance_km: f64) -> ServiceHit {
        ServiceHit {
            service: Service {
                id: 1,
                name: name.to_string(),
                category: ServiceCategory::Health,
                description: None,
                phone: Some("+250788111222".to_string()),
                address: Some("KG 7 Ave".to_string()),
                hours: Some("Mon-Fri 8:00-17:00".to_string()),
                required_documents: None,
                location: GeoPoint { lat: 0.0, lng: 0.0 },
            },
            distance_km,
        }
    }

    #[test]
    fn test_greeting_localized() {
        assert!(greeting(Language::En).starts_with("Hello!"));
        assert!(greeting(Language::Rw).starts_with("Muraho!"));
    }

    #[test]
    fn test_service_list_structure() {
        let hits = vec![hit("Kacyiru Hospital", 1.234), hit("Remera Clinic", 3.8)];
        let text = service_list(Language::En, Some(ServiceCategory::Health), &hits);
        assert!(text.starts_with("Found 2 health services near you:"));
        assert!(text.contains("1. Kacyiru Hospital (1.2 km)"));
        assert!(text.contains("2. Remera Clinic (3.8 km)"));
        assert!(text.contains("Address: KG 7 Ave"));
        assert!(text.contains("Hours: Mon-Fri 8:00-17:00"));
        assert!(text.ends_with("Enter the number of the service you want directions to (example: '1')."));
    }

    #[test]
    fn test_service_list_without_category() {
        let hits = vec![hit("NIDA Office", 0.5)];
        let text = service_list(Language::En, None, &hits);
        assert!(text.starts_with("Found 1 government services near you:"));
    }

    #[test]
    fn test_hours_with_and_without_data() {
        let with = hit("Kacyiru Hospital", 1.0).service;
        assert!(service_hours(Language::En, &with).contains("Mon-Fri 8:00-17:00"));

        let mut without = with.clone();
        without.hours = None;
        assert!(service_hours(Language::En, &without).starts_with("Sorry, no information"));
        assert!(service_hours(Language::Rw, &without).starts_with("Mbabarira"));
    }

    #[test]
    fn test_follow_up_question_names_service() {
        let en = follow_up_question(Language::En, "Kacyiru Hospital");
        assert!(en.contains("Kacyiru Hospital"));
        assert!(en.contains("YES or NO"));
        let rw = follow_up_question(Language::Rw, "Kacyiru Hospital");
        assert!(rw.contains("YEGO cyangwa OYA"));
    }

    #[test]
    fn test_directions_preamble_rounds_distance() {
        assert_eq!(
            directions_preamble(Language::En, "NIDA Office", 2.345),
            "Directions to NIDA Office (2.3 km):\n\n"
        );
    }
}
